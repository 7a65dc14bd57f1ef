//! Smoke screen unit tests for the vacation engine components
//!
//! These span the crate and exercise each component in isolation from the
//! persisted scenarios, plus the service's rollback and single-writer
//! behaviour against an in-memory repository.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use vacation_ledger::{
    Employee, VacationError, VacationPolicy, VacationService, VacationStatus,
    alerts, calendar,
    entitlement::{self, Entitlement},
    ledger::{CancellationReason, EntryDraft, EntryKind, Ledger},
    overview::VacationOverview,
    repository::{EmployeeRepository, InMemoryRepository},
    types::{EmployeeId, Money, Period, TimeStamp},
    validator::{self, PeriodWarning},
};

const ACTOR: &str = "hr_admin";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

fn stamp() -> TimeStamp<Utc> {
    TimeStamp::from(now())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Repository whose saves can be switched to fail.
#[derive(Default)]
struct FlakyRepository {
    inner: InMemoryRepository,
    fail_saves: AtomicBool,
}

impl EmployeeRepository for FlakyRepository {
    fn load(&self, id: &EmployeeId) -> anyhow::Result<Option<Employee>> {
        self.inner.load(id)
    }

    fn save(&self, employee: &Employee) -> anyhow::Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        self.inner.save(employee)
    }
}

// CALENDAR MODULE TESTS
#[cfg(test)]
mod calendar_tests {
    use super::*;

    #[test]
    fn four_hundred_days_is_thirteen_months() {
        let admission = today() - Duration::days(400);
        assert_eq!(calendar::months_between(admission, today()), 13);
        assert_eq!(calendar::days_between(admission, today()), 400);
    }

    #[test]
    fn inclusive_count_includes_both_ends() {
        let start = today();
        assert_eq!(calendar::inclusive_day_count(start, start + Duration::days(13)).unwrap(), 14);
        assert!(calendar::inclusive_day_count(start, start - Duration::days(1)).is_err());
    }
}

// ENTITLEMENT MODULE TESTS
#[cfg(test)]
mod entitlement_tests {
    use super::*;

    #[test]
    fn outstanding_sales_reduce_both_balances() {
        let policy = VacationPolicy::default();
        let mut ledger = Ledger::new();
        ledger
            .append(EntryDraft::sale(4, Money::default()), stamp(), ACTOR)
            .unwrap();

        let result = entitlement::calculate(today() - Duration::days(400), &ledger, today(), &policy);

        assert_eq!(result.available_days, 26);
        assert_eq!(result.sellable_days, 6);
    }

    #[test]
    fn cancelled_schedule_does_not_count_as_taken() {
        let policy = VacationPolicy::default();
        let mut ledger = Ledger::new();
        let period = Period::new(today() - Duration::days(100), today() - Duration::days(91));
        let schedule = ledger
            .append(EntryDraft::schedule(period, 10), stamp(), ACTOR)
            .unwrap();
        ledger
            .append(
                EntryDraft::cancellation_of(&schedule, CancellationReason::BusinessNeed, None),
                stamp(),
                ACTOR,
            )
            .unwrap();

        let result = entitlement::calculate(today() - Duration::days(800), &ledger, today(), &policy);
        assert_eq!(result.status, VacationStatus::Overdue);
    }

    #[test]
    fn eleven_months_is_still_no_entitlement() {
        let employee = Employee::new(
            EmployeeId::new().unwrap(),
            today() - Duration::days(340),
            Money::default(),
        );
        let result = Entitlement::for_employee(&employee, today(), &VacationPolicy::default());

        assert_eq!(result.status, VacationStatus::NoEntitlement);
        assert_eq!(result.available_days, 0);
    }
}

// VALIDATOR MODULE TESTS
#[cfg(test)]
mod validator_tests {
    use super::*;

    #[test]
    fn warnings_never_block() {
        let start = today();
        let result = validator::validate_period(start, start + Duration::days(1), 30, &VacationPolicy::default());

        assert!(result.valid);
        assert_eq!(result.days, 2);
        assert!(matches!(result.warnings[..], [PeriodWarning::TooShort { .. }]));
    }

    #[test]
    fn fourteen_day_period_is_valid() {
        let start = today();
        let result = validator::validate_period(start, start + Duration::days(13), 30, &VacationPolicy::default());

        assert!(result.valid);
        assert_eq!(result.days, 14);
    }
}

// ALERTS MODULE TESTS
#[cfg(test)]
mod alerts_tests {
    use super::*;

    #[test]
    fn scheduled_period_produces_countdown() {
        let mut employee = Employee::new(
            EmployeeId::new().unwrap(),
            today() - Duration::days(400),
            Money::default(),
        );
        let period = Period::new(today() + Duration::days(45), today() + Duration::days(59));
        employee
            .ledger
            .append(EntryDraft::schedule(period, 15), stamp(), ACTOR)
            .unwrap();

        let result = alerts::VacationAlerts::for_employee(&employee, today(), &VacationPolicy::default());

        assert_eq!(result.next_period.unwrap().days_remaining, 45);
        assert!(result.first_deadline.is_some());
    }
}

// SERVICE TESTS
#[cfg(test)]
mod service_tests {
    use super::*;

    #[test]
    fn failed_save_leaves_ledger_untouched() {
        init_tracing();
        let repository = Arc::new(FlakyRepository::default());
        let service = VacationService::new(repository.clone());
        let employee = service
            .enroll(today() - Duration::days(400), Money::new(dec!(3000)))
            .unwrap();

        repository.fail_saves.store(true, Ordering::SeqCst);
        let err = service.sell_vacation(&employee.id, 5, ACTOR, now()).unwrap_err();
        assert!(matches!(err, VacationError::Persistence(_)));
        assert!(!err.is_validation());

        repository.fail_saves.store(false, Ordering::SeqCst);
        assert!(service.history(&employee.id).unwrap().is_empty());
        assert_eq!(service.entitlement(&employee.id, now()).unwrap().sellable_days, 10);
    }

    #[test]
    fn unknown_employee_is_reported() {
        let service = VacationService::new(Arc::new(InMemoryRepository::new()));
        let missing = EmployeeId::new().unwrap();

        let err = service.sell_vacation(&missing, 1, ACTOR, now()).unwrap_err();
        assert!(matches!(err, VacationError::EmployeeNotFound(id) if id == missing));
    }

    #[test]
    fn zero_day_sale_is_rejected() {
        let service = VacationService::new(Arc::new(InMemoryRepository::new()));
        let employee = service
            .enroll(today() - Duration::days(400), Money::new(dec!(3000)))
            .unwrap();

        let err = service.sell_vacation(&employee.id, 0, ACTOR, now()).unwrap_err();
        assert!(matches!(err, VacationError::InvalidDays));
        assert!(err.is_validation());
    }

    #[test]
    fn cancel_sale_rejects_a_schedule_id() {
        let service = VacationService::new(Arc::new(InMemoryRepository::new()));
        let employee = service
            .enroll(today() - Duration::days(400), Money::new(dec!(3000)))
            .unwrap();
        let start = today() + Duration::days(5);
        let scheduled = service
            .schedule_vacation(&employee.id, start, start + Duration::days(9), ACTOR, now())
            .unwrap();

        let err = service
            .cancel_sale(&employee.id, &scheduled.entry.id, CancellationReason::Other, None, ACTOR, now())
            .unwrap_err();

        assert!(matches!(err, VacationError::NotFound { kind: EntryKind::Sale, .. }));
        assert_eq!(service.history(&employee.id).unwrap().len(), 1);
    }

    #[test]
    fn preview_does_not_write() {
        let service = VacationService::new(Arc::new(InMemoryRepository::new()));
        let employee = service
            .enroll(today() - Duration::days(400), Money::new(dec!(3000)))
            .unwrap();
        let start = today() + Duration::days(5);

        let preview = service
            .preview_period(&employee.id, start, start + Duration::days(40), now())
            .unwrap();

        assert!(!preview.valid);
        assert!(service.history(&employee.id).unwrap().is_empty());
    }

    #[test]
    fn concurrent_sales_cannot_overdraw_the_quota() {
        let service = Arc::new(VacationService::new(Arc::new(InMemoryRepository::new())));
        let employee = service
            .enroll(today() - Duration::days(400), Money::new(dec!(3000)))
            .unwrap();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let barrier = barrier.clone();
                let id = employee.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.sell_vacation(&id, 3, ACTOR, now()).is_ok()
                })
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // 10 sellable days fit three sales of 3
        assert_eq!(succeeded, 3);
        let entitlement = service.entitlement(&employee.id, now()).unwrap();
        assert_eq!(entitlement.available_days, 21);
        assert_eq!(entitlement.sellable_days, 1);
    }

    #[test]
    fn overview_counts_mandatory_vacations() {
        let service = VacationService::new(Arc::new(InMemoryRepository::new()));
        let ids: Vec<_> = [100, 400, 800]
            .into_iter()
            .map(|days_ago| {
                service
                    .enroll(today() - Duration::days(days_ago), Money::new(dec!(3000)))
                    .unwrap()
                    .id
            })
            .collect();

        let overview = service.overview(&ids, now()).unwrap();

        assert_eq!(
            overview,
            VacationOverview {
                total: 3,
                no_entitlement: 1,
                on_track: 1,
                overdue: 1,
                mandatory_vacations: 1,
                scheduled: 0,
            }
        );
    }

    #[test]
    fn custom_policy_changes_the_sellable_cap() {
        let policy = VacationPolicy {
            sellable_cap_days: 5,
            ..VacationPolicy::default()
        };
        let service = VacationService::with_policy(Arc::new(InMemoryRepository::new()), policy).unwrap();
        let employee = service
            .enroll(today() - Duration::days(400), Money::new(dec!(3000)))
            .unwrap();

        let err = service.sell_vacation(&employee.id, 6, ACTOR, now()).unwrap_err();
        assert!(matches!(
            err,
            VacationError::ExceedsSellableLimit { requested: 6, sellable: 5 }
        ));
    }

    #[test]
    fn invalid_policy_is_refused_at_construction() {
        let policy = VacationPolicy {
            vesting_months: 0,
            ..VacationPolicy::default()
        };

        let result = VacationService::with_policy(Arc::new(InMemoryRepository::new()), policy);
        assert!(result.is_err());
    }
}
