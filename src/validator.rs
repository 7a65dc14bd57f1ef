//! Pre-commit checks for a proposed vacation period
use chrono::NaiveDate;

use crate::calendar;
use crate::config::VacationPolicy;
use crate::error::PeriodError;

/// Advisory findings; they never block scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodWarning {
    TooShort { days: i64, recommended_minimum: u32 },
    TooLong { days: i64, maximum: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodValidation {
    pub valid: bool,
    pub days: i64,
    pub errors: Vec<PeriodError>,
    pub warnings: Vec<PeriodWarning>,
}

/// `days` is the inclusive day count, which is zero or negative for reversed ranges.
pub fn validate_period(
    start: NaiveDate,
    end: NaiveDate,
    available_days: u32,
    policy: &VacationPolicy,
) -> PeriodValidation {
    let days = calendar::days_between(start, end) + 1;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if days <= 0 {
        errors.push(PeriodError::NonPositiveRange { days });
    }
    if days > i64::from(available_days) {
        errors.push(PeriodError::InsufficientBalance {
            requested: days,
            available: available_days,
        });
    }
    // a reversed range is already an error; length advice does not apply
    if days > 0 && days < i64::from(policy.short_period_days) {
        warnings.push(PeriodWarning::TooShort {
            days,
            recommended_minimum: policy.short_period_days,
        });
    }
    if days > i64::from(policy.long_period_days) {
        warnings.push(PeriodWarning::TooLong {
            days,
            maximum: policy.long_period_days,
        });
    }

    PeriodValidation {
        valid: errors.is_empty(),
        days,
        errors,
        warnings,
    }
}
