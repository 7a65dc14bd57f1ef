//! Vacation entitlement and accrual engine.
//!
//! Balances are derived on every read from an employee's admission date and
//! an append-only ledger of sales, scheduled periods and their cancellations.
//! `now` is always supplied by the caller.

pub mod alerts;
pub mod calendar;
pub mod config;
pub mod employee;
pub mod entitlement;
pub mod error;
pub mod ledger;
pub mod overview;
pub mod repository;
pub mod service;
pub mod types;
pub mod utils;
pub mod validator;

pub use config::VacationPolicy;
pub use employee::Employee;
pub use entitlement::{Entitlement, VacationStatus};
pub use error::VacationError;
pub use service::{VacationOutcome, VacationService};
