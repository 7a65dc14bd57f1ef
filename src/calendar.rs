//! Elapsed-time arithmetic over calendar dates
use chrono::{Months, NaiveDate};

use crate::error::RangeError;

/// Average month length used by every month computation in the engine.
pub const AVERAGE_MONTH_DAYS: f64 = 30.44;

/// Whole "average months" elapsed from `a` to `b`. Negative when `b` precedes `a`.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (days_between(a, b) as f64 / AVERAGE_MONTH_DAYS).floor() as i64
}

/// `b - a` in days.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> Result<u32, RangeError> {
    if end < start {
        return Err(RangeError::EndBeforeStart { start, end });
    }
    u32::try_from(days_between(start, end) + 1).map_err(|_| RangeError::TooLong { start, end })
}

// calendar month addition, clamped to the last day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
