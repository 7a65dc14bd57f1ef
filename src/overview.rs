use chrono::NaiveDate;

use crate::config::VacationPolicy;
use crate::employee::Employee;
use crate::entitlement::{Entitlement, VacationStatus};

/// Workforce-level vacation figures for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VacationOverview {
    pub total: usize,
    pub no_entitlement: usize,
    pub on_track: usize,
    pub overdue: usize,
    /// Employees with expired days who must be sent on leave.
    pub mandatory_vacations: usize,
    pub scheduled: usize,
}

impl VacationOverview {
    pub fn from_employees<'a, I>(employees: I, now: NaiveDate, policy: &VacationPolicy) -> Self
    where
        I: IntoIterator<Item = &'a Employee>,
    {
        employees
            .into_iter()
            .fold(Self::default(), |mut overview, employee| {
                let entitlement = Entitlement::for_employee(employee, now, policy);

                overview.total += 1;
                match entitlement.status {
                    VacationStatus::NoEntitlement => overview.no_entitlement += 1,
                    VacationStatus::OnTrack => overview.on_track += 1,
                    VacationStatus::Overdue => overview.overdue += 1,
                }
                if entitlement.expired_days > 0 {
                    overview.mandatory_vacations += 1;
                }
                if employee.scheduled_period().is_some() {
                    overview.scheduled += 1;
                }
                overview
            })
    }
}
