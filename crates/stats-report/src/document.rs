//! Static HTML document shell and file output for chart pages.

use std::path::{Path, PathBuf};

use serde::Serialize;
use stats_core::error::{Result, StatsError};

/// Charting library loaded by every page.
pub const CHART_SCRIPT_URL: &str = "https://cdn.canvasjs.com/canvasjs.min.js";

/// Id of the `<div>` every chart renders into.
pub const CHART_CONTAINER_ID: &str = "chartContainer";

/// Wrap an inline chart `script` into a complete HTML page titled `title`.
pub fn render_page(title: &str, script: &str) -> String {
    format!(
        r#"<!DOCTYPE HTML>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
<script>
{script}
</script>
</head>
<body>
<div id="{container}" style="height: 300px; width: 100%;"></div>
<script src="{src}"></script>
</body>
</html>
"#,
        title = html_escape(title),
        script = script,
        container = CHART_CONTAINER_ID,
        src = CHART_SCRIPT_URL,
    )
}

/// Serialize `value` for embedding inside a `<script>` element.
///
/// `</` is escaped so a label can never close the script element early.
pub fn script_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// File name of the page for `title`: `{title}.html`.
///
/// Path separators are replaced so the file always lands in the output
/// directory itself.
pub fn chart_file_name(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!("{}.html", safe)
}

/// Write `html` to `{dir}/{title}.html` and return the path written.
pub fn write_document(dir: &Path, title: &str, html: &str) -> Result<PathBuf> {
    let path = dir.join(chart_file_name(title));
    std::fs::write(&path, html).map_err(|source| StatsError::FileWrite {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = html.len(), "chart written");
    Ok(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
