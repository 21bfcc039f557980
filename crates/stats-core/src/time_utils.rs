use chrono::Month;

use crate::error::{Result, StatsError};

// ── Month resolution ──────────────────────────────────────────────────────────

/// A target month in the three forms the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMonth {
    /// Abbreviation exactly as it appears in access-log timestamps, e.g. `"Jan"`.
    pub abbreviation: String,
    /// 1-based month number.
    pub number: u32,
    /// Full English name, e.g. `"January"`.
    pub name: String,
}

impl TargetMonth {
    /// Resolve a month given as an abbreviation or full name, in any case.
    ///
    /// The stored abbreviation is always the capitalised three-letter form used
    /// by the common log format, so `"jan"`, `"JAN"` and `"January"` all
    /// resolve to `"Jan"`.
    pub fn parse(input: &str) -> Result<Self> {
        let month: Month = input
            .trim()
            .parse()
            .map_err(|_| StatsError::InvalidMonth(input.to_string()))?;
        Ok(Self::from_month(month))
    }

    pub fn from_month(month: Month) -> Self {
        let name = month.name().to_string();
        Self {
            abbreviation: name[..3].to_string(),
            number: month.number_from_month(),
            name,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
