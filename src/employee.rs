use chrono::NaiveDate;

use crate::ledger::{Ledger, ScheduledPeriod};
use crate::types::{EmployeeId, Money};

/// The vacation-relevant part of an employee record.
///
/// Balances and status are not stored here; they are derived from
/// `admission_date` and `ledger` on every read.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Employee {
    #[n(0)]
    pub id: EmployeeId,
    #[n(1)]
    #[cbor(with = "crate::types::naive_date")]
    admission_date: NaiveDate,
    #[n(2)]
    pub salary: Money,
    #[n(3)]
    pub ledger: Ledger,
}

impl Employee {
    pub fn new(id: EmployeeId, admission_date: NaiveDate, salary: Money) -> Self {
        Self {
            id,
            admission_date,
            salary,
            ledger: Ledger::new(),
        }
    }

    pub fn admission_date(&self) -> NaiveDate {
        self.admission_date
    }

    pub fn scheduled_period(&self) -> Option<ScheduledPeriod> {
        self.ledger.find_active_scheduled_period()
    }
}
