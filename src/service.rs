//! Service layer API for vacation operations
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use crate::alerts::VacationAlerts;
use crate::calendar;
use crate::config::VacationPolicy;
use crate::employee::Employee;
use crate::entitlement::Entitlement;
use crate::error::{PeriodError, VacationError};
use crate::ledger::{CancellationReason, EntryDraft, EntryKind, LedgerEntry};
use crate::overview::VacationOverview;
use crate::repository::EmployeeRepository;
use crate::types::{EmployeeId, EntryId, Money, Period, TimeStamp};
use crate::validator::{self, PeriodValidation};

/// Salary is monthly; a day's pay is a thirtieth of it.
const SALARY_DAYS_PER_MONTH: u32 = 30;

/// Result of a committed mutation: the persisted employee, the entry that was
/// appended and the balances as they read right after.
#[derive(Debug, Clone)]
pub struct VacationOutcome {
    pub employee: Employee,
    pub entry: LedgerEntry,
    pub entitlement: Entitlement,
}

pub struct VacationService<R: EmployeeRepository> {
    repository: Arc<R>,
    policy: VacationPolicy,
    // one writer per employee; readers work on loaded snapshots
    locks: Mutex<HashMap<EmployeeId, Arc<Mutex<()>>>>,
}

/// `(salary / 30) * days * (1 + bonus)`, rounded to cents. `None` on overflow.
pub fn sale_amount(salary: Money, days: u32, policy: &VacationPolicy) -> Option<Money> {
    if policy.sale_bonus_denominator == 0 {
        return None;
    }
    let numerator = Decimal::from(policy.sale_bonus_denominator)
        .checked_add(Decimal::from(policy.sale_bonus_numerator))?;
    let denominator =
        Decimal::from(SALARY_DAYS_PER_MONTH).checked_mul(Decimal::from(policy.sale_bonus_denominator))?;

    salary
        .amount()
        .checked_mul(Decimal::from(days))?
        .checked_mul(numerator)?
        .checked_div(denominator)
        .map(|amount| {
            amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        })
        .map(Money::new)
}

impl<R: EmployeeRepository> VacationService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            policy: VacationPolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Service with custom rule constants. Rejects policies that fail
    /// [`VacationPolicy::validate`].
    pub fn with_policy(repository: Arc<R>, policy: VacationPolicy) -> anyhow::Result<Self> {
        policy.validate()?;
        Ok(Self {
            repository,
            policy,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn policy(&self) -> &VacationPolicy {
        &self.policy
    }

    /// Create an employee with an empty ledger and persist it.
    pub fn enroll(&self, admission_date: NaiveDate, salary: Money) -> Result<Employee, VacationError> {
        let id = EmployeeId::new().map_err(VacationError::Persistence)?;
        let employee = Employee::new(id, admission_date, salary);
        self.repository
            .save(&employee)
            .map_err(VacationError::Persistence)?;

        info!(employee = %employee.id, %admission_date, "employee enrolled");
        Ok(employee)
    }

    /// Load an employee snapshot from the repository
    pub fn load_employee(&self, employee_id: &EmployeeId) -> Result<Employee, VacationError> {
        self.repository
            .load(employee_id)
            .map_err(VacationError::Persistence)?
            .ok_or_else(|| VacationError::EmployeeNotFound(employee_id.clone()))
    }

    pub fn entitlement(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Entitlement, VacationError> {
        let employee = self.load_employee(employee_id)?;
        Ok(Entitlement::for_employee(&employee, now.date_naive(), &self.policy))
    }

    pub fn alerts(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<VacationAlerts, VacationError> {
        let employee = self.load_employee(employee_id)?;
        Ok(VacationAlerts::for_employee(&employee, now.date_naive(), &self.policy))
    }

    /// Run the period validator against the current balance without committing.
    pub fn preview_period(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PeriodValidation, VacationError> {
        let entitlement = self.entitlement(employee_id, now)?;
        Ok(validator::validate_period(
            start,
            end,
            entitlement.available_days,
            &self.policy,
        ))
    }

    /// Ledger entries in insertion order.
    pub fn history(&self, employee_id: &EmployeeId) -> Result<Vec<LedgerEntry>, VacationError> {
        Ok(self.load_employee(employee_id)?.ledger.entries().to_vec())
    }

    pub fn overview(
        &self,
        employee_ids: &[EmployeeId],
        now: DateTime<Utc>,
    ) -> Result<VacationOverview, VacationError> {
        let employees = employee_ids
            .iter()
            .map(|id| self.load_employee(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VacationOverview::from_employees(
            &employees,
            now.date_naive(),
            &self.policy,
        ))
    }

    /// Schedule a period of leave. Only one period may be pending at a time.
    pub fn schedule_vacation(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<VacationOutcome, VacationError> {
        self.with_employee(employee_id, |employee| {
            let entitlement = Entitlement::for_employee(employee, now.date_naive(), &self.policy);

            let validation =
                validator::validate_period(start, end, entitlement.available_days, &self.policy);
            if !validation.valid {
                warn!(employee = %employee_id, errors = ?validation.errors, "vacation period rejected");
                return Err(VacationError::Validation {
                    errors: validation.errors,
                });
            }
            if !validation.warnings.is_empty() {
                info!(employee = %employee_id, warnings = ?validation.warnings, "vacation period accepted with warnings");
            }

            if let Some(active) = employee.scheduled_period() {
                warn!(employee = %employee_id, active = %active.entry_id, "vacation already scheduled");
                return Err(VacationError::AlreadyScheduled(active.entry_id));
            }

            let days = calendar::inclusive_day_count(start, end).map_err(|_| {
                VacationError::Validation {
                    errors: vec![PeriodError::NonPositiveRange {
                        days: validation.days,
                    }],
                }
            })?;

            let draft = EntryDraft::schedule(Period::new(start, end), days);
            self.commit(employee, draft, actor, now)
        })
    }

    /// Sell `days` of the sellable quota for `(salary / 30) * days` plus the bonus.
    pub fn sell_vacation(
        &self,
        employee_id: &EmployeeId,
        days: u32,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<VacationOutcome, VacationError> {
        if days == 0 {
            return Err(VacationError::InvalidDays);
        }

        self.with_employee(employee_id, |employee| {
            let entitlement = Entitlement::for_employee(employee, now.date_naive(), &self.policy);
            if days > entitlement.sellable_days {
                warn!(
                    employee = %employee_id,
                    requested = days,
                    sellable = entitlement.sellable_days,
                    "sale exceeds sellable quota"
                );
                return Err(VacationError::ExceedsSellableLimit {
                    requested: days,
                    sellable: entitlement.sellable_days,
                });
            }

            let amount =
                sale_amount(employee.salary, days, &self.policy).ok_or(VacationError::AmountOverflow)?;
            self.commit(employee, EntryDraft::sale(days, amount), actor, now)
        })
    }

    pub fn cancel_sale(
        &self,
        employee_id: &EmployeeId,
        sale_entry_id: &EntryId,
        reason_code: CancellationReason,
        reason_text: Option<String>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<VacationOutcome, VacationError> {
        self.cancel(
            employee_id,
            EntryKind::Sale,
            sale_entry_id,
            reason_code,
            reason_text,
            actor,
            now,
        )
    }

    pub fn cancel_schedule(
        &self,
        employee_id: &EmployeeId,
        schedule_entry_id: &EntryId,
        reason_code: CancellationReason,
        reason_text: Option<String>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<VacationOutcome, VacationError> {
        self.cancel(
            employee_id,
            EntryKind::Schedule,
            schedule_entry_id,
            reason_code,
            reason_text,
            actor,
            now,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn cancel(
        &self,
        employee_id: &EmployeeId,
        kind: EntryKind,
        entry_id: &EntryId,
        reason_code: CancellationReason,
        reason_text: Option<String>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<VacationOutcome, VacationError> {
        self.with_employee(employee_id, |employee| {
            let target = employee
                .ledger
                .get(entry_id)
                .filter(|entry| entry.kind == kind && !employee.ledger.is_cancelled(&entry.id))
                .ok_or_else(|| VacationError::NotFound {
                    kind,
                    id: entry_id.clone(),
                })?;

            let draft = EntryDraft::cancellation_of(target, reason_code, reason_text);
            self.commit(employee, draft, actor, now)
        })
    }

    fn employee_lock(&self, employee_id: &EmployeeId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(employee_id.clone()).or_default().clone()
    }

    /// Load the employee and run `operation` while holding its writer lock.
    fn with_employee<F>(&self, employee_id: &EmployeeId, operation: F) -> Result<VacationOutcome, VacationError>
    where
        F: FnOnce(&mut Employee) -> Result<VacationOutcome, VacationError>,
    {
        let lock = self.employee_lock(employee_id);
        let result = {
            let _writer = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.load_employee(employee_id)
                .and_then(|mut employee| operation(&mut employee))
        };
        self.release_lock(employee_id, &lock);
        result
    }

    // registry + this caller are the only holders: nobody is queued behind us
    fn release_lock(&self, employee_id: &EmployeeId, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(lock) == 2 {
            locks.remove(employee_id);
        }
    }

    /// Append then persist. A failed save removes the appended entry again so
    /// the in-memory ledger never runs ahead of storage.
    fn commit(
        &self,
        employee: &mut Employee,
        draft: EntryDraft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<VacationOutcome, VacationError> {
        let entry = employee.ledger.append(draft, TimeStamp::from(now), actor)?;

        if let Err(err) = self.repository.save(employee) {
            employee.ledger.rollback(&entry.id);
            warn!(employee = %employee.id, entry = %entry.id, error = %err, "save failed, entry rolled back");
            return Err(VacationError::Persistence(err));
        }

        info!(
            employee = %employee.id,
            entry = %entry.id,
            kind = ?entry.kind,
            days = entry.days,
            actor,
            "ledger entry committed"
        );

        Ok(VacationOutcome {
            entitlement: Entitlement::for_employee(employee, now.date_naive(), &self.policy),
            employee: employee.clone(),
            entry,
        })
    }
}
