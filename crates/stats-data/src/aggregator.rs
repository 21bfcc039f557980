//! Visit aggregation over classified access-log lines.
//!
//! A [`VisitAggregator`] owns the three running tallies for one run (or, in
//! parallel runs, for one archive) and folds lines into them one at a time.

use stats_core::classifier::Classifier;
use stats_core::models::{DayOfMonthTally, HourTally, PlatformTally, VisitTallies};

// ── VisitAggregator ───────────────────────────────────────────────────────────

/// Running platform, hour-of-day and day-of-month tallies.
#[derive(Debug, Clone)]
pub struct VisitAggregator {
    classifier: Classifier,
    platforms: PlatformTally,
    hours: HourTally,
    days: DayOfMonthTally,
    lines_ingested: u64,
}

impl VisitAggregator {
    /// Create an aggregator with zeroed tallies.
    ///
    /// `labels` is the platform priority list; `target_month` is the
    /// three-letter abbreviation (e.g. `"Jan"`) whose days are tallied.
    pub fn new(labels: &[String], target_month: impl Into<String>) -> Self {
        Self {
            classifier: Classifier::new(labels.iter().cloned(), target_month),
            platforms: PlatformTally::new(labels.iter().cloned()),
            hours: HourTally::new(),
            days: DayOfMonthTally::new(),
            lines_ingested: 0,
        }
    }

    /// Fresh aggregator with the same configuration and empty tallies.
    pub fn empty_like(&self) -> Self {
        let labels: Vec<String> = self.classifier.labels().map(str::to_string).collect();
        Self::new(&labels, self.classifier.target_month())
    }

    /// Classify `line` and add its observations to the tallies.
    pub fn ingest(&mut self, line: &str) {
        let obs = self.classifier.classify(line);
        self.lines_ingested += 1;

        if let Some(platform) = &obs.platform {
            self.platforms.increment(platform);
        }
        if let Some(hour) = obs.hour {
            self.hours.increment(hour);
        }
        if let Some(day) = obs.day.as_deref().filter(|_| obs.in_target_month) {
            self.days.increment(day);
        }
    }

    /// Ingest every line of a decoded log file.
    pub fn ingest_text(&mut self, text: &str) {
        for line in text.lines() {
            self.ingest(line);
        }
    }

    /// Fold another aggregator's tallies into this one.
    pub fn merge(&mut self, other: &VisitAggregator) {
        self.platforms.merge(&other.platforms);
        self.hours.merge(&other.hours);
        self.days.merge(&other.days);
        self.lines_ingested += other.lines_ingested;
    }

    pub fn lines_ingested(&self) -> u64 {
        self.lines_ingested
    }

    pub fn platforms(&self) -> &PlatformTally {
        &self.platforms
    }

    pub fn hours(&self) -> &HourTally {
        &self.hours
    }

    pub fn days(&self) -> &DayOfMonthTally {
        &self.days
    }

    /// Consume the aggregator and return the finished tallies.
    pub fn finalize(self) -> VisitTallies {
        VisitTallies {
            platforms: self.platforms,
            hours: self.hours,
            days: self.days,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
