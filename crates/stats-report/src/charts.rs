//! Chart pages for the three visit aggregates.
//!
//! Each renderer turns a finished tally into an ordered list of typed data
//! points, serializes the chart configuration as JSON and wraps it into a
//! self-contained page via [`render_page`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use stats_core::error::Result;
use stats_core::models::{DayOfMonthTally, HourTally, PlatformPercentage, VisitTallies};
use stats_core::time_utils::TargetMonth;

use crate::document::{render_page, script_json, write_document, CHART_CONTAINER_ID};

/// Title (and file stem) of the platform pie chart.
pub const PLATFORMS_TITLE: &str = "Platforms Usage";

/// Title (and file stem) of the hour-of-day column chart.
pub const HOURS_TITLE: &str = "Visits Per Hour";

/// Title of the day-of-month chart, e.g. `"Daily Visits (January)"`.
pub fn daily_title(month: &TargetMonth) -> String {
    format!("Daily Visits ({})", month.name)
}

// ── Data points ───────────────────────────────────────────────────────────────

/// One pie segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiePoint {
    pub y: f64,
    pub name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub exploded: bool,
}

/// One column of the hour-of-day chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourPoint {
    pub x: u8,
    pub y: u64,
}

/// One point of the day-of-month area chart. The page turns `day` into a
/// date on the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayPoint {
    pub day: u32,
    pub y: u64,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Pie segments sorted by descending share; only the largest is exploded.
pub fn pie_points(percentages: &PlatformPercentage) -> Vec<PiePoint> {
    percentages
        .sorted_descending()
        .into_iter()
        .enumerate()
        .map(|(i, (name, y))| PiePoint {
            y,
            name: name.to_string(),
            exploded: i == 0,
        })
        .collect()
}

pub fn hour_points(hours: &HourTally) -> Vec<HourPoint> {
    hours.iter().map(|(x, y)| HourPoint { x, y }).collect()
}

pub fn day_points(days: &DayOfMonthTally) -> Vec<DayPoint> {
    days.iter()
        .filter_map(|(day, y)| day.parse().ok().map(|day| DayPoint { day, y }))
        .collect()
}

// ── Renderers ─────────────────────────────────────────────────────────────────

/// Pie chart of platform shares. Clicking a legend entry toggles its
/// explosion.
pub fn render_pie_chart(title: &str, percentages: &PlatformPercentage) -> Result<String> {
    let config = json!({
        "exportEnabled": true,
        "animationEnabled": true,
        "title": { "text": title },
        "legend": { "cursor": "pointer" },
        "data": [{
            "type": "pie",
            "showInLegend": true,
            "toolTipContent": "{name}: <strong>{y}%</strong>",
            "indexLabel": "{name} - {y}%",
            "dataPoints": pie_points(percentages),
        }],
    });

    let script = format!(
        r#"window.onload = function () {{
var config = {config};
config.legend.itemclick = explodePie;
var chart = new CanvasJS.Chart("{container}", config);
chart.render();
}}

function explodePie (e) {{
	var point = e.dataSeries.dataPoints[e.dataPointIndex];
	point.exploded = !point.exploded;
	e.chart.render();
}}"#,
        config = script_json(&config)?,
        container = CHART_CONTAINER_ID,
    );

    Ok(render_page(title, &script))
}

/// Column chart of visits per hour-of-day, one column per observed hour.
pub fn render_hour_column_chart(title: &str, hours: &HourTally) -> Result<String> {
    let config = json!({
        "animationEnabled": true,
        "exportEnabled": true,
        "theme": "light1",
        "title": { "text": title },
        "axisY": { "includeZero": true },
        "data": [{
            "type": "column",
            "indexLabelFontColor": "#5A5757",
            "indexLabelFontSize": 16,
            "indexLabelPlacement": "outside",
            "dataPoints": hour_points(hours),
        }],
    });

    let script = format!(
        r#"window.onload = function () {{
var chart = new CanvasJS.Chart("{container}", {config});
chart.render();
}}"#,
        config = script_json(&config)?,
        container = CHART_CONTAINER_ID,
    );

    Ok(render_page(title, &script))
}

/// Area chart of visits per day of month `month_index` (1-based).
pub fn render_day_area_chart(
    title: &str,
    month_index: u32,
    days: &DayOfMonthTally,
) -> Result<String> {
    let crosshair = json!({ "enabled": true, "snapToDataPoint": true });
    let config = json!({
        "animationEnabled": true,
        "title": { "text": title },
        "axisX": { "valueFormatString": "DD MMM", "crosshair": crosshair },
        "axisY": { "crosshair": crosshair },
        "data": [{
            "type": "area",
            "xValueFormatString": "DD MMM",
            "dataPoints": day_points(days),
        }],
    });

    let script = format!(
        r#"window.onload = function () {{
var config = {config};
var month = {month};
config.data[0].dataPoints = config.data[0].dataPoints.map(function (p) {{
	return {{ x: new Date(0, month, p.day), y: p.y }};
}});
var chart = new CanvasJS.Chart("{container}", config);
chart.render();
}}"#,
        config = script_json(&config)?,
        month = month_index.saturating_sub(1),
        container = CHART_CONTAINER_ID,
    );

    Ok(render_page(title, &script))
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Render all three charts for `tallies` and write them into `dir`.
///
/// Returns the written paths in pie, hour, day order.
pub fn write_reports(
    dir: &Path,
    month: &TargetMonth,
    tallies: &VisitTallies,
) -> Result<Vec<PathBuf>> {
    if tallies.platforms.total() == 0 {
        tracing::warn!("no line matched any platform label; platform shares reported as 0%");
    }

    let daily = daily_title(month);
    let pages = [
        (
            PLATFORMS_TITLE.to_string(),
            render_pie_chart(PLATFORMS_TITLE, &tallies.platforms.percentages())?,
        ),
        (
            HOURS_TITLE.to_string(),
            render_hour_column_chart(HOURS_TITLE, &tallies.hours)?,
        ),
        (
            daily.clone(),
            render_day_area_chart(&daily, month.number, &tallies.days)?,
        ),
    ];

    pages
        .iter()
        .map(|(title, html)| write_document(dir, title, html))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::models::{PlatformTally, DEFAULT_PLATFORM_LABELS};
    use tempfile::TempDir;

    fn percentages(counts: &[(&str, u64)]) -> PlatformPercentage {
        let mut tally = PlatformTally::new(DEFAULT_PLATFORM_LABELS);
        for (label, n) in counts {
            for _ in 0..*n {
                tally.increment(label);
            }
        }
        tally.percentages()
    }

    // ── pie ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_pie_points_sorted_and_first_exploded() {
        let points = pie_points(&percentages(&[("Android", 3), ("iPhone", 1)]));

        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Android", "iPhone", "iPad", "Windows"]);
        assert!(points[0].exploded);
        assert!(points.iter().skip(1).all(|p| !p.exploded));
        assert!((points[0].y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_pie_point_serialization_omits_false_explosion() {
        let points = pie_points(&percentages(&[("iPad", 1), ("Windows", 1)]));
        let json = serde_json::to_string(&points).unwrap();
        assert!(json.starts_with(r#"[{"y":50.0,"name":"iPad","exploded":true}"#));
        assert_eq!(json.matches("exploded").count(), 1);
    }

    #[test]
    fn test_render_pie_chart() {
        let page = render_pie_chart("Platforms Usage", &percentages(&[("iPhone", 1)])).unwrap();
        assert!(page.contains("<title>Platforms Usage</title>"));
        assert!(page.contains(r#""type":"pie""#));
        assert!(page.contains(r#""exploded":true"#));
        assert!(page.contains(r#""name":"iPhone""#));
        assert!(page.contains("function explodePie"));
    }

    #[test]
    fn test_render_pie_chart_escapes_labels() {
        let mut tally = PlatformTally::new(["</script><b>"]);
        tally.increment("</script><b>");
        let page = render_pie_chart("t", &tally.percentages()).unwrap();
        assert_eq!(page.matches("</script>").count(), 2);
    }

    // ── hours ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_hour_column_chart() {
        let mut hours = HourTally::new();
        hours.increment(23);
        hours.increment(0);
        hours.increment(0);

        let points = hour_points(&hours);
        assert_eq!(points, vec![HourPoint { x: 0, y: 2 }, HourPoint { x: 23, y: 1 }]);

        let page = render_hour_column_chart("Visits Per Hour", &hours).unwrap();
        assert!(page.contains(r#""type":"column""#));
        assert!(page.contains(r#""x":23"#));
        assert_eq!(page.matches(r#""x":"#).count(), 2);
    }

    // ── days ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_day_points_cover_all_days() {
        let mut days = DayOfMonthTally::new();
        days.increment("05");
        let points = day_points(&days);
        assert_eq!(points.len(), 31);
        assert_eq!(points[0], DayPoint { day: 1, y: 0 });
        assert_eq!(points[4], DayPoint { day: 5, y: 1 });
    }

    #[test]
    fn test_render_day_area_chart_uses_zero_based_month() {
        let page =
            render_day_area_chart("Daily Visits (February)", 2, &DayOfMonthTally::new()).unwrap();
        assert!(page.contains("var month = 1;"));
        assert!(page.contains(r#""type":"area""#));
        assert!(page.contains("new Date(0, month, p.day)"));
        assert!(page.contains("<title>Daily Visits (February)</title>"));
    }

    // ── write_reports ─────────────────────────────────────────────────────────

    #[test]
    fn test_write_reports_creates_three_pages() {
        let tmp = TempDir::new().expect("tempdir");
        let month = TargetMonth::parse("Jan").unwrap();
        let tallies = VisitTallies {
            platforms: PlatformTally::new(DEFAULT_PLATFORM_LABELS),
            hours: HourTally::new(),
            days: DayOfMonthTally::new(),
        };

        let paths = write_reports(tmp.path(), &month, &tallies).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "Platforms Usage.html",
                "Visits Per Hour.html",
                "Daily Visits (January).html"
            ]
        );
        assert!(paths.iter().all(|p| p.is_file()));

        let pie = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(pie.contains(r#""y":0.0"#));
    }
}
