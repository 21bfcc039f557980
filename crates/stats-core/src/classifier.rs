//! Access-log line classification.
//!
//! Extracts the client platform and the request timestamp fields from one
//! raw line. Classification never fails: lines that do not carry a piece of
//! information simply yield `None` for it.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Observation;

/// Matches a common-log timestamp such as `05/Jan/2024:13:02:11`.
const TIMESTAMP_PATTERN: &str =
    r"\b([0-9]{2})/([A-Za-z]{3})/[0-9]{4}:([0-9]{2}):[0-9]{2}:[0-9]{2}\b";

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("regex is valid"))
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Platform matcher over an ordered label priority list, bound to the month
/// whose days are being counted.
///
/// Labels are checked in the order given; the first label whose lowercase
/// form occurs in the lowercased line wins, so a line mentioning both `iPad`
/// and `iPhone` is attributed to whichever comes first in the list.
#[derive(Debug, Clone)]
pub struct Classifier {
    /// `(label, lowercase label)` in priority order.
    labels: Vec<(String, String)>,
    target_month: String,
}

impl Classifier {
    pub fn new<I, S>(labels: I, target_month: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels
            .into_iter()
            .map(|l| {
                let label: String = l.into();
                let lower = label.to_lowercase();
                (label, lower)
            })
            .collect();
        Self {
            labels,
            target_month: target_month.into(),
        }
    }

    /// Configured labels in priority order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(l, _)| l.as_str())
    }

    /// Three-letter month abbreviation lines are matched against.
    pub fn target_month(&self) -> &str {
        &self.target_month
    }

    /// Classify one raw log line.
    pub fn classify(&self, line: &str) -> Observation {
        let mut observation = Observation {
            platform: self.match_platform(line),
            ..Default::default()
        };

        if let Some((hour, day, month)) = parse_timestamp(line) {
            observation.hour = hour;
            observation.day = Some(day.to_string());
            observation.month = Some(month.to_string());
        }
        observation.in_target_month = observation.in_month(&self.target_month);

        observation
    }

    fn match_platform(&self, line: &str) -> Option<String> {
        let lowered = line.to_lowercase();
        self.labels
            .iter()
            .find(|(_, lower)| lowered.contains(lower.as_str()))
            .map(|(label, _)| label.clone())
    }
}

/// Classify `line` against `labels` and `target_month` without keeping a
/// [`Classifier`] around.
pub fn classify(line: &str, labels: &[String], target_month: &str) -> Observation {
    Classifier::new(labels.iter().cloned(), target_month).classify(line)
}

/// Locate the first timestamp in `line` and split out `(hour, day, month)`.
///
/// Returns `None` when no timestamp is present. An hour field outside
/// `0..=23` yields `None` for the hour only; day and month are kept.
fn parse_timestamp(line: &str) -> Option<(Option<u8>, &str, &str)> {
    let caps = timestamp_regex().captures(line)?;
    let day = caps.get(1)?.as_str();
    let month = caps.get(2)?.as_str();
    let hour = caps
        .get(3)
        .and_then(|h| h.as_str().parse::<u8>().ok())
        .filter(|h| *h <= 23);
    Some((hour, day, month))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
