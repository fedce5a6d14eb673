//! Row types shared by the aggregator, the reshaper and the report sinks

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Seconds in one day of the lookback window
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("window length must be a positive number of days")]
    Zero,
    #[error("window of {days} days is outside the allowed range {min}..={max}")]
    OutOfRange { days: u32, min: u32, max: u32 },
}

/// Lookback window length in days. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WindowDays(u32);

impl WindowDays {
    pub fn new(days: u32) -> Result<Self, WindowError> {
        if days == 0 {
            return Err(WindowError::Zero);
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.0) * SECS_PER_DAY)
    }

    /// Earliest instant included in the window ending at `now`.
    ///
    /// Saturates at the earliest representable instant, so a very long window
    /// simply has no lower bound.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.duration())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl TryFrom<u32> for WindowDays {
    type Error = WindowError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<WindowDays> for u32 {
    fn from(window: WindowDays) -> Self {
        window.0
    }
}

impl fmt::Display for WindowDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.0)
    }
}

/// Number of logins for one species on one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub category: String,
    pub count: u64,
}

impl DailyCount {
    pub fn new(day: NaiveDate, category: impl Into<String>, count: u64) -> Self {
        Self {
            day,
            category: category.into(),
            count,
        }
    }
}

/// Window total for one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: u64,
}

impl CategoryTotal {
    pub fn new(category: impl Into<String>, total: u64) -> Self {
        Self {
            category: category.into(),
            total,
        }
    }
}

/// Window total for one classification label (e.g. a diet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTotal {
    pub classification: String,
    pub total: u64,
}

/// Leaderboard order: total descending, then name ascending.
pub(crate) fn rank_order(a_name: &str, a_total: u64, b_name: &str, b_total: u64) -> Ordering {
    b_total.cmp(&a_total).then_with(|| a_name.cmp(b_name))
}

/// Day x category matrix of counts, zero-filled.
///
/// `cells[i][j]` is the count for `days[i]` and `categories[j]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    pub days: Vec<NaiveDate>,
    pub categories: Vec<String>,
    pub cells: Vec<Vec<u64>>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.categories.is_empty()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.days.len(), self.categories.len())
    }

    pub fn get(&self, day: NaiveDate, category: &str) -> Option<u64> {
        let row = self.days.binary_search(&day).ok()?;
        let col = self.categories.iter().position(|c| c == category)?;
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// One series per category, in column order. This is what a line or area
    /// chart plots.
    pub fn column(&self, category: &str) -> Option<Vec<u64>> {
        let col = self.categories.iter().position(|c| c == category)?;
        Some(self.cells.iter().map(|row| row[col]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[u64])> + '_ {
        self.days
            .iter()
            .copied()
            .zip(self.cells.iter().map(Vec::as_slice))
    }
}
