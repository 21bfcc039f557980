use serde::Serialize;
use std::collections::BTreeMap;

/// Default platform labels, in priority order.
pub const DEFAULT_PLATFORM_LABELS: [&str; 4] = ["iPad", "iPhone", "Android", "Windows"];

/// Number of day keys every [`DayOfMonthTally`] carries.
pub const DAYS_IN_LONGEST_MONTH: u8 = 31;

// ── Observation ───────────────────────────────────────────────────────────────

/// Facts extracted from a single access-log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// First configured platform label found in the line.
    pub platform: Option<String>,
    /// Hour-of-day of the request timestamp.
    pub hour: Option<u8>,
    /// Zero-padded day-of-month, e.g. `"05"`.
    pub day: Option<String>,
    /// Three-letter month abbreviation as written in the log, e.g. `"Jan"`.
    pub month: Option<String>,
    /// `month` equals the configured target month.
    pub in_target_month: bool,
}

impl Observation {
    /// `true` when the line carries a timestamp in `target_month`.
    ///
    /// The comparison is case-sensitive.
    pub fn in_month(&self, target_month: &str) -> bool {
        self.month.as_deref() == Some(target_month)
    }
}

// ── PlatformTally ─────────────────────────────────────────────────────────────

/// Per-platform request counts, kept in label priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlatformTally {
    counts: Vec<(String, u64)>,
}

impl PlatformTally {
    /// Create a tally with a zero entry for every label.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            counts: labels.into_iter().map(|l| (l.into(), 0)).collect(),
        }
    }

    /// Add one to `label`. Labels outside the configured set are ignored.
    pub fn increment(&mut self, label: &str) {
        if let Some((_, count)) = self.counts.iter_mut().find(|(l, _)| l == label) {
            *count += 1;
        }
    }

    /// Count for `label`, or `None` if the label is not configured.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    /// Sum across all labels.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// `(label, count)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(l, count)| (l.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Share of each label in percent.
    ///
    /// When no line matched any label, every label reports `0.0`.
    pub fn percentages(&self) -> PlatformPercentage {
        let total = self.total();
        let entries = self
            .counts
            .iter()
            .map(|(label, count)| {
                let pct = if total == 0 {
                    0.0
                } else {
                    (*count as f64 * 100.0) / total as f64
                };
                (label.clone(), pct)
            })
            .collect();
        PlatformPercentage { entries }
    }

    /// Add every count from `other` into `self`.
    pub fn merge(&mut self, other: &PlatformTally) {
        for (label, count) in &other.counts {
            if let Some((_, mine)) = self.counts.iter_mut().find(|(l, _)| l == label) {
                *mine += count;
            }
        }
    }
}

// ── PlatformPercentage ────────────────────────────────────────────────────────

/// Platform shares in percent, in label priority order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformPercentage {
    entries: Vec<(String, f64)>,
}

impl PlatformPercentage {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, pct)| (l.as_str(), *pct))
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, pct)| *pct)
    }

    /// Entries ordered by descending share. Ties keep priority order.
    pub fn sorted_descending(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<(&str, f64)> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
        sorted
    }
}

// ── HourTally ─────────────────────────────────────────────────────────────────

/// Requests per hour-of-day. Hours appear only once observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HourTally {
    counts: BTreeMap<u8, u64>,
}

impl HourTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, hour: u8) {
        *self.counts.entry(hour).or_insert(0) += 1;
    }

    /// Count for `hour`; unobserved hours read as zero.
    pub fn get(&self, hour: u8) -> u64 {
        self.counts.get(&hour).copied().unwrap_or(0)
    }

    /// `(hour, count)` pairs in ascending hour order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(h, c)| (*h, *c))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn merge(&mut self, other: &HourTally) {
        for (hour, count) in &other.counts {
            *self.counts.entry(*hour).or_insert(0) += count;
        }
    }
}

// ── DayOfMonthTally ───────────────────────────────────────────────────────────

/// Requests per day of the target month, keyed `"01"` to `"31"`.
///
/// All 31 keys exist from construction on. Days past the end of a shorter
/// month simply stay at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DayOfMonthTally {
    counts: BTreeMap<String, u64>,
}

impl Default for DayOfMonthTally {
    fn default() -> Self {
        Self::new()
    }
}

impl DayOfMonthTally {
    pub fn new() -> Self {
        let counts = (1..=DAYS_IN_LONGEST_MONTH)
            .map(|day| (format!("{:02}", day), 0))
            .collect();
        Self { counts }
    }

    /// Add one to `day`. Keys outside `"01"..="31"` are ignored so the key set
    /// never changes.
    pub fn increment(&mut self, day: &str) {
        match self.counts.get_mut(day) {
            Some(count) => *count += 1,
            None => tracing::trace!(day, "ignoring out-of-range day key"),
        }
    }

    pub fn get(&self, day: &str) -> Option<u64> {
        self.counts.get(day).copied()
    }

    /// `(day, count)` pairs in ascending day order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(d, c)| (d.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn merge(&mut self, other: &DayOfMonthTally) {
        for (day, count) in &other.counts {
            if let Some(mine) = self.counts.get_mut(day) {
                *mine += count;
            }
        }
    }
}

// ── VisitTallies ──────────────────────────────────────────────────────────────

/// Finalized snapshot of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitTallies {
    pub platforms: PlatformTally,
    pub hours: HourTally,
    pub days: DayOfMonthTally,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn default_tally() -> PlatformTally {
        PlatformTally::new(DEFAULT_PLATFORM_LABELS)
    }

    // ── PlatformTally ─────────────────────────────────────────────────────────

    #[test]
    fn test_platform_tally_starts_at_zero_for_every_label() {
        let tally = default_tally();
        assert_eq!(tally.len(), 4);
        assert!(tally.iter().all(|(_, count)| count == 0));
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn test_platform_tally_keeps_priority_order() {
        let tally = default_tally();
        let labels: Vec<&str> = tally.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["iPad", "iPhone", "Android", "Windows"]);
    }

    #[test]
    fn test_platform_tally_ignores_unknown_label() {
        let mut tally = default_tally();
        tally.increment("BlackBerry");
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.get("BlackBerry"), None);
    }

    #[test]
    fn test_platform_tally_merge() {
        let mut a = default_tally();
        a.increment("iPad");
        let mut b = default_tally();
        b.increment("iPad");
        b.increment("Windows");

        a.merge(&b);
        assert_eq!(a.get("iPad"), Some(2));
        assert_eq!(a.get("Windows"), Some(1));
        assert_eq!(a.total(), 3);
    }

    // ── PlatformPercentage ────────────────────────────────────────────────────

    #[test]
    fn test_percentages_three_to_one() {
        let mut tally = PlatformTally::new(["A", "B"]);
        for _ in 0..3 {
            tally.increment("A");
        }
        tally.increment("B");

        let pct = tally.percentages();
        assert!((pct.get("A").unwrap() - 75.0).abs() < 1e-9);
        assert!((pct.get("B").unwrap() - 25.0).abs() < 1e-9);
        let sum: f64 = pct.iter().map(|(_, p)| p).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_zero_total_reports_zero() {
        let pct = default_tally().percentages();
        assert!(pct.iter().all(|(_, p)| p == 0.0));
        assert_eq!(pct.iter().count(), 4);
    }

    #[test]
    fn test_sorted_descending_is_stable_on_ties() {
        let mut tally = default_tally();
        tally.increment("Android");
        tally.increment("Android");
        tally.increment("iPhone");
        tally.increment("Windows");

        let sorted = tally.percentages();
        let labels: Vec<&str> = sorted.sorted_descending().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Android", "iPhone", "Windows", "iPad"]);
    }

    // ── HourTally ─────────────────────────────────────────────────────────────

    #[test]
    fn test_hour_tally_lazy_entries() {
        let mut hours = HourTally::new();
        assert!(hours.is_empty());
        assert_eq!(hours.get(13), 0);

        hours.increment(13);
        hours.increment(13);
        hours.increment(2);
        assert_eq!(hours.len(), 2);
        assert_eq!(hours.get(13), 2);

        let ordered: Vec<u8> = hours.iter().map(|(h, _)| h).collect();
        assert_eq!(ordered, vec![2, 13]);
    }

    #[test]
    fn test_hour_tally_merge_adds_new_hours() {
        let mut a = HourTally::new();
        a.increment(1);
        let mut b = HourTally::new();
        b.increment(1);
        b.increment(23);

        a.merge(&b);
        assert_eq!(a.get(1), 2);
        assert_eq!(a.get(23), 1);
    }

    // ── DayOfMonthTally ───────────────────────────────────────────────────────

    #[test]
    fn test_day_tally_has_31_zeroed_keys() {
        let days = DayOfMonthTally::new();
        assert_eq!(days.len(), 31);
        assert!(days.iter().all(|(_, count)| count == 0));

        let keys: Vec<&str> = days.iter().map(|(d, _)| d).collect();
        assert_eq!(keys.first(), Some(&"01"));
        assert_eq!(keys.last(), Some(&"31"));
    }

    #[test]
    fn test_day_tally_ignores_out_of_range_keys() {
        let mut days = DayOfMonthTally::new();
        days.increment("00");
        days.increment("32");
        days.increment("05");
        assert_eq!(days.len(), 31);
        assert_eq!(days.total(), 1);
        assert_eq!(days.get("05"), Some(1));
    }

    #[test]
    fn test_observation_in_month_is_case_sensitive() {
        let obs = Observation {
            month: Some("Jan".to_string()),
            ..Default::default()
        };
        assert!(obs.in_month("Jan"));
        assert!(!obs.in_month("jan"));
        assert!(!Observation::default().in_month("Jan"));
    }
}
