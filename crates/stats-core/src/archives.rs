//! Archive identifiers and the ranges they are enumerated from.

use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// Ranges covering the January, February and early March 2013 daily logs.
pub const DEFAULT_ARCHIVE_RANGES: [ArchiveRange; 3] = [
    ArchiveRange::new(130101, 130131),
    ArchiveRange::new(130201, 130228),
    ArchiveRange::new(130301, 130306),
];

// ── ArchiveId ─────────────────────────────────────────────────────────────────

/// Date-stamped identifier of one daily log archive, e.g. `130115`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveId(pub u32);

impl ArchiveId {
    /// File name of the compressed archive: `access_{id}.zip`.
    pub fn archive_name(&self) -> String {
        format!("access_{}.zip", self.0)
    }

    /// Name of the single log member inside the archive: `access_{id}.log`.
    pub fn member_name(&self) -> String {
        format!("access_{}.log", self.0)
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ArchiveRange ──────────────────────────────────────────────────────────────

/// Inclusive range of archive ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveRange {
    pub start: u32,
    pub end: u32,
}

impl ArchiveRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn ids(&self) -> impl Iterator<Item = ArchiveId> {
        (self.start..=self.end).map(ArchiveId)
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Accepts `START-END` or a single `ID`.
impl FromStr for ArchiveRange {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StatsError::InvalidArchiveRange(s.to_string());
        let parse = |part: &str| part.trim().parse::<u32>().map_err(|_| invalid());

        let (start, end) = match s.split_once('-') {
            Some((a, b)) => (parse(a)?, parse(b)?),
            None => {
                let id = parse(s)?;
                (id, id)
            }
        };

        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for ArchiveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Expand `ranges` into ids: range order first, ascending within a range.
pub fn expand_ranges(ranges: &[ArchiveRange]) -> Vec<ArchiveId> {
    ranges.iter().flat_map(|r| r.ids()).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
