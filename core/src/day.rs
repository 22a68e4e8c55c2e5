//! Day boundaries.
//!
//! A logged timestamp belongs to the day whose window contains it. With the
//! default rollover hour of 0 that is plain calendar midnight; a rollover hour
//! of 6 makes 02:00 count toward the previous day.

use anyhow::{Result, bail};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayBoundary {
    rollover_hour: u32,
}

impl DayBoundary {
    /// Calendar midnight.
    pub const MIDNIGHT: DayBoundary = DayBoundary { rollover_hour: 0 };

    pub fn new(rollover_hour: u32) -> Result<Self> {
        if rollover_hour > 23 {
            bail!("Day rollover hour must be between 0 and 23 (got {rollover_hour})");
        }
        Ok(Self { rollover_hour })
    }

    #[must_use]
    pub fn rollover_hour(self) -> u32 {
        self.rollover_hour
    }

    /// The day a timestamp is counted toward.
    #[must_use]
    pub fn day_of(self, ts: NaiveDateTime) -> NaiveDate {
        (ts - Duration::hours(i64::from(self.rollover_hour))).date()
    }

    /// First instant of `date`.
    #[must_use]
    pub fn start_of(self, date: NaiveDate) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(self.rollover_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }

    /// Half-open `[start, end)` window for `date`.
    #[must_use]
    pub fn range_for(self, date: NaiveDate) -> DateRange {
        let start = self.start_of(date);
        DateRange {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Window covering `days` consecutive days ending with `last` (inclusive).
    #[must_use]
    pub fn range_ending(self, last: NaiveDate, days: u32) -> DateRange {
        let first = last - Duration::days(i64::from(days.max(1)) - 1);
        DateRange {
            start: self.start_of(first),
            end: self.start_of(last) + Duration::days(1),
        }
    }
}

/// Half-open timestamp interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }
}
