//! Append-only vacation ledger.
//!
//! Entries are never removed once committed. A sale or a scheduled period is
//! reversed by appending a compensating cancellation that references it, so
//! the full history of an employee's vacation operations stays auditable and
//! every balance can be re-derived by folding the entries in order.
use chrono::Utc;

use crate::error::LedgerError;
use crate::types::{EntryId, Money, Period, TimeStamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
pub enum EntryKind {
    #[n(0)]
    Sale,
    #[n(1)]
    Schedule,
    #[n(2)]
    SaleCancellation,
    #[n(3)]
    ScheduleCancellation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
pub enum CancellationReason {
    #[n(0)]
    EmployeeRequest,
    #[n(1)]
    BusinessNeed,
    #[n(2)]
    EnteredInError,
    #[n(3)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct LedgerEntry {
    #[n(0)]
    pub id: EntryId,
    #[n(1)]
    pub kind: EntryKind,
    #[n(2)]
    pub days: u32,
    #[n(3)]
    pub amount: Option<Money>, // sales and their cancellations
    #[n(4)]
    pub period: Option<Period>, // schedules and their cancellations
    #[n(5)]
    pub reason_code: Option<CancellationReason>,
    #[n(6)]
    pub reason_text: Option<String>,
    #[n(7)]
    pub referenced_entry_id: Option<EntryId>,
    #[n(8)]
    pub created_at: TimeStamp<Utc>,
    #[n(9)]
    pub created_by: String,
}

/// An entry before the ledger has assigned its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub days: u32,
    pub amount: Option<Money>,
    pub period: Option<Period>,
    pub reason_code: Option<CancellationReason>,
    pub reason_text: Option<String>,
    pub referenced_entry_id: Option<EntryId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPeriod {
    pub entry_id: EntryId,
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Ledger {
    #[n(0)]
    entries: Vec<LedgerEntry>,
}

impl EntryKind {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EntryKind::SaleCancellation | EntryKind::ScheduleCancellation)
    }
    /// The kind of entry a cancellation of this kind may reverse.
    pub fn reverses(&self) -> Option<EntryKind> {
        match self {
            EntryKind::SaleCancellation => Some(EntryKind::Sale),
            EntryKind::ScheduleCancellation => Some(EntryKind::Schedule),
            _ => None,
        }
    }
}

impl EntryDraft {
    pub fn sale(days: u32, amount: Money) -> Self {
        Self {
            kind: EntryKind::Sale,
            days,
            amount: Some(amount),
            period: None,
            reason_code: None,
            reason_text: None,
            referenced_entry_id: None,
        }
    }
    pub fn schedule(period: Period, days: u32) -> Self {
        Self {
            kind: EntryKind::Schedule,
            days,
            amount: None,
            period: Some(period),
            reason_code: None,
            reason_text: None,
            referenced_entry_id: None,
        }
    }
    /// Compensating entry mirroring `target`'s days, amount and period.
    pub fn cancellation_of(
        target: &LedgerEntry,
        reason_code: CancellationReason,
        reason_text: Option<String>,
    ) -> Self {
        let kind = match target.kind {
            EntryKind::Schedule => EntryKind::ScheduleCancellation,
            // cancelling a cancellation is rejected on append as a kind mismatch
            _ => EntryKind::SaleCancellation,
        };
        Self {
            kind,
            days: target.days,
            amount: target.amount,
            period: target.period,
            reason_code: Some(reason_code),
            reason_text,
            referenced_entry_id: Some(target.id.clone()),
        }
    }
}

impl LedgerEntry {
    /// CBOR encoding of the entry and its sha256 digest.
    pub fn build(&self) -> anyhow::Result<(String, Vec<u8>)> {
        let cbor = minicbor::to_vec(self)?;
        let hash = sha256::digest(&cbor);

        Ok((hash, cbor))
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// The compensating entry that reverses `id`, if any.
    pub fn cancellation_of(&self, id: &EntryId) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind.is_cancellation() && entry.referenced_entry_id.as_ref() == Some(id))
    }

    pub fn is_cancelled(&self, id: &EntryId) -> bool {
        self.cancellation_of(id).is_some()
    }

    /// Validates `draft`, assigns it an id and timestamp and appends it.
    pub fn append(
        &mut self,
        draft: EntryDraft,
        created_at: TimeStamp<Utc>,
        created_by: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        if draft.days == 0 {
            return Err(LedgerError::ZeroDays);
        }

        if let Some(expected) = draft.kind.reverses() {
            let (Some(target_id), Some(_)) = (&draft.referenced_entry_id, &draft.reason_code) else {
                return Err(LedgerError::MissingCancellationDetails(draft.kind));
            };
            let target = self
                .get(target_id)
                .ok_or_else(|| LedgerError::UnknownReference(target_id.clone()))?;
            if target.kind != expected {
                return Err(LedgerError::ReferenceKindMismatch {
                    cancellation: draft.kind,
                    target: target.kind,
                });
            }
            if self.is_cancelled(target_id) {
                return Err(LedgerError::DuplicateCancellation(target_id.clone()));
            }
            if draft.days != target.days || draft.amount != target.amount || draft.period != target.period {
                return Err(LedgerError::CancellationMismatch(target_id.clone()));
            }
        }

        let has_payload = match draft.kind {
            EntryKind::Sale | EntryKind::SaleCancellation => draft.amount.is_some(),
            EntryKind::Schedule | EntryKind::ScheduleCancellation => draft.period.is_some(),
        };
        if !has_payload {
            return Err(LedgerError::MissingPayload(draft.kind));
        }

        let id = EntryId::new().map_err(|err| LedgerError::IdAllocation(err.to_string()))?;
        let entry = LedgerEntry {
            id,
            kind: draft.kind,
            days: draft.days,
            amount: draft.amount,
            period: draft.period,
            reason_code: draft.reason_code,
            reason_text: draft.reason_text,
            referenced_entry_id: draft.referenced_entry_id,
            created_at,
            created_by: created_by.to_string(),
        };
        self.entries.push(entry.clone());

        Ok(entry)
    }

    /// Drops the most recent entry if it is `id`. Used to undo an append whose
    /// persistence failed; committed history is never rolled back.
    pub(crate) fn rollback(&mut self, id: &EntryId) -> Option<LedgerEntry> {
        match self.entries.last() {
            Some(last) if &last.id == id => self.entries.pop(),
            _ => None,
        }
    }

    /// Most recent schedule that has not been cancelled.
    pub fn find_active_scheduled_period(&self) -> Option<ScheduledPeriod> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.kind == EntryKind::Schedule)
            .find(|entry| !self.is_cancelled(&entry.id))
            .and_then(|entry| {
                entry.period.map(|period| ScheduledPeriod {
                    entry_id: entry.id.clone(),
                    start: period.start,
                    end: period.end,
                    days: entry.days,
                })
            })
    }

    pub fn active_schedule_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::Schedule && !self.is_cancelled(&entry.id))
            .count()
    }

    /// Days of sales that have not been reversed by a sale cancellation.
    pub fn sold_days_outstanding(&self) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::Sale && !self.is_cancelled(&entry.id))
            .fold(0u32, |sold, entry| sold.saturating_add(entry.days))
    }
}
