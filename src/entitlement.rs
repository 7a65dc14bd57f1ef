//! Entitlement derivation from admission date, ledger and the caller's "now".
use chrono::NaiveDate;
use tracing::debug;

use crate::calendar;
use crate::config::VacationPolicy;
use crate::employee::Employee;
use crate::ledger::Ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VacationStatus {
    NoEntitlement,
    OnTrack,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    pub status: VacationStatus,
    pub available_days: u32,
    pub sellable_days: u32,
    pub expired_days: u32,
}

impl Entitlement {
    fn none() -> Self {
        Self {
            status: VacationStatus::NoEntitlement,
            available_days: 0,
            sellable_days: 0,
            expired_days: 0,
        }
    }

    pub fn for_employee(employee: &Employee, now: NaiveDate, policy: &VacationPolicy) -> Self {
        calculate(employee.admission_date(), &employee.ledger, now, policy)
    }
}

/// Raw accrual before outstanding sales are deducted.
///
/// `has_taken_period` is whether any non-cancelled schedule exists; without
/// one, passing the expiration deadline marks the grant as expired.
pub fn accrue(
    admission_date: NaiveDate,
    has_taken_period: bool,
    now: NaiveDate,
    policy: &VacationPolicy,
) -> Entitlement {
    let months_worked = calendar::months_between(admission_date, now);
    if months_worked < policy.vesting_months {
        return Entitlement::none();
    }

    let Some(years_worked) = months_worked.checked_div(policy.vesting_months) else {
        return Entitlement::none();
    };
    let accrued = i64::from(policy.annual_grant_days).saturating_mul(years_worked);
    let available_days = accrued.min(i64::from(policy.accumulation_cap_days)) as u32;
    let sellable_days = policy.sellable_cap_days.min(available_days);

    let past_deadline = calendar::add_months(admission_date, policy.expiration_months)
        .is_some_and(|deadline| now > deadline);

    let (status, expired_days) = if past_deadline && !has_taken_period {
        (VacationStatus::Overdue, policy.expired_days)
    } else if months_worked >= policy.on_track_months {
        (VacationStatus::OnTrack, 0)
    } else {
        (VacationStatus::NoEntitlement, 0)
    };

    Entitlement {
        status,
        available_days,
        sellable_days,
        expired_days,
    }
}

/// Accrual adjusted by the days sold and not yet reversed.
pub fn calculate(
    admission_date: NaiveDate,
    ledger: &Ledger,
    now: NaiveDate,
    policy: &VacationPolicy,
) -> Entitlement {
    let raw = accrue(admission_date, ledger.active_schedule_count() > 0, now, policy);
    let sold = ledger.sold_days_outstanding();

    let available_days = raw.available_days.saturating_sub(sold);
    let sellable_days = raw.sellable_days.saturating_sub(sold).min(available_days);

    debug!(
        status = ?raw.status,
        raw_available = raw.available_days,
        sold,
        available_days,
        sellable_days,
        "derived entitlement"
    );

    Entitlement {
        available_days,
        sellable_days,
        ..raw
    }
}
