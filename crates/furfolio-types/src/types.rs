//! Shared value types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Longest day span accepted for windows, lookbacks and horizons
pub const MAX_SPAN_DAYS: u32 = 36_500;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDate(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending at (and including) `end`, clipped
    /// to the earliest representable date
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: end
                .checked_sub_signed(chrono::Duration::days(span))
                .unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len_days() as usize)
    }
}

/// Parse a `YYYY-MM-DD` date from user input
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidDate(format!("{}: {}", s, e)))
}
