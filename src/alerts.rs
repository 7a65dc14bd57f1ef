use chrono::NaiveDate;

use crate::calendar;
use crate::config::VacationPolicy;
use crate::employee::Employee;
use crate::ledger::ScheduledPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineAlert {
    pub days_remaining: i64,
    pub overdue: bool,
    pub early_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPeriodAlert {
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VacationAlerts {
    pub first_deadline: Option<DeadlineAlert>,
    pub next_period: Option<NextPeriodAlert>,
}

impl VacationAlerts {
    pub fn for_employee(employee: &Employee, now: NaiveDate, policy: &VacationPolicy) -> Self {
        evaluate(
            employee.admission_date(),
            employee.scheduled_period().as_ref(),
            now,
            policy,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.first_deadline.is_none() && self.next_period.is_none()
    }
}

/// Informational thresholds for notification layers. Never mutates anything.
pub fn evaluate(
    admission_date: NaiveDate,
    scheduled_period: Option<&ScheduledPeriod>,
    now: NaiveDate,
    policy: &VacationPolicy,
) -> VacationAlerts {
    let months_worked = calendar::months_between(admission_date, now);

    let first_deadline = if months_worked >= policy.vesting_months {
        u32::try_from(policy.vesting_months)
            .ok()
            .and_then(|months| calendar::add_months(admission_date, months))
            .map(|deadline| {
                let days_remaining = calendar::days_between(now, deadline);
                DeadlineAlert {
                    days_remaining,
                    overdue: days_remaining < -policy.overdue_grace_days,
                    early_warning: days_remaining > 0 && days_remaining <= policy.early_warning_days,
                }
            })
    } else {
        None
    };

    let next_period = scheduled_period.map(|period| NextPeriodAlert {
        days_remaining: calendar::days_between(now, period.start),
    });

    VacationAlerts {
        first_deadline,
        next_period,
    }
}
