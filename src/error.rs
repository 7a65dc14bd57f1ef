use chrono::NaiveDate;

use crate::ledger::EntryKind;
use crate::types::{EmployeeId, EntryId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("period ends on {end} before it starts on {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("period {start}..={end} is too long to count")]
    TooLong { start: NaiveDate, end: NaiveDate },
}

/// Blocking findings of the period validator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period covers {days} days")]
    NonPositiveRange { days: i64 },
    #[error("period of {requested} days exceeds the {available} available days")]
    InsufficientBalance { requested: i64, available: u32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger entries must cover at least one day")]
    ZeroDays,
    #[error("referenced entry {0} is not in the ledger")]
    UnknownReference(EntryId),
    #[error("a {cancellation:?} cannot reverse a {target:?} entry")]
    ReferenceKindMismatch {
        cancellation: EntryKind,
        target: EntryKind,
    },
    #[error("entry {0} has already been cancelled")]
    DuplicateCancellation(EntryId),
    #[error("{0:?} entries need a referenced entry and a reason")]
    MissingCancellationDetails(EntryKind),
    #[error("cancellation of {0} must carry the same days, amount and period")]
    CancellationMismatch(EntryId),
    #[error("{0:?} entries need an amount (sales) or a period (schedules)")]
    MissingPayload(EntryKind),
    #[error("failed to allocate an entry id: {0}")]
    IdAllocation(String),
}

#[derive(thiserror::Error, Debug)]
pub enum VacationError {
    #[error("vacation period rejected: {errors:?}")]
    Validation { errors: Vec<PeriodError> },
    #[error("cannot sell {requested} days, only {sellable} are sellable")]
    ExceedsSellableLimit { requested: u32, sellable: u32 },
    #[error("employee already has an active scheduled period ({0})")]
    AlreadyScheduled(EntryId),
    #[error("day count must be positive")]
    InvalidDays,
    #[error("sale amount does not fit a decimal")]
    AmountOverflow,
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("no active {kind:?} entry {id}")]
    NotFound { kind: EntryKind, id: EntryId },
    #[error("entry {0} has already been cancelled")]
    DuplicateCancellation(EntryId),
    #[error(transparent)]
    Ledger(LedgerError),
    #[error("persistence failed: {0}")]
    Persistence(anyhow::Error),
}

impl From<LedgerError> for VacationError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::DuplicateCancellation(id) => VacationError::DuplicateCancellation(id),
            other => VacationError::Ledger(other),
        }
    }
}

impl VacationError {
    /// Rejected before touching the ledger; the caller can correct the input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            VacationError::Validation { .. }
                | VacationError::ExceedsSellableLimit { .. }
                | VacationError::AlreadyScheduled(_)
                | VacationError::InvalidDays
        )
    }
}
