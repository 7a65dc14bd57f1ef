//! Storage seam for employee records
use sled::{Batch, Db};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::employee::Employee;
use crate::types::EmployeeId;

const EMPLOYEE_KEY_PREFIX: &str = "employee/";

pub trait EmployeeRepository: Send + Sync {
    fn load(&self, id: &EmployeeId) -> anyhow::Result<Option<Employee>>;
    fn save(&self, employee: &Employee) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    employees: RwLock<HashMap<EmployeeId, Employee>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EmployeeRepository for InMemoryRepository {
    fn load(&self, id: &EmployeeId) -> anyhow::Result<Option<Employee>> {
        let employees = self.employees.read().unwrap_or_else(PoisonError::into_inner);
        Ok(employees.get(id).cloned())
    }

    fn save(&self, employee: &Employee) -> anyhow::Result<()> {
        let mut employees = self.employees.write().unwrap_or_else(PoisonError::into_inner);
        employees.insert(employee.id.clone(), employee.clone());
        Ok(())
    }
}

/// sled-backed store. The employee record is kept as CBOR under
/// `employee/<id>` and every ledger entry is also written under its sha256
/// digest, in the same batch, as a content-addressed audit copy.
pub struct SledRepository {
    instance: Arc<Db>,
}

impl SledRepository {
    pub fn new(instance: Arc<Db>) -> Self {
        Self { instance }
    }

    fn employee_key(id: &EmployeeId) -> Vec<u8> {
        format!("{EMPLOYEE_KEY_PREFIX}{id}").into_bytes()
    }

    /// Fetch an audit copy of a ledger entry by its digest.
    pub fn load_entry(&self, digest: &str) -> anyhow::Result<Option<crate::ledger::LedgerEntry>> {
        match self.instance.get(digest.as_bytes())? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl EmployeeRepository for SledRepository {
    fn load(&self, id: &EmployeeId) -> anyhow::Result<Option<Employee>> {
        match self.instance.get(Self::employee_key(id))? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, employee: &Employee) -> anyhow::Result<()> {
        let mut batch = Batch::default();
        for entry in employee.ledger.entries() {
            let (digest, cbor) = entry.build()?;
            batch.insert(digest.as_bytes(), cbor);
        }
        batch.insert(Self::employee_key(&employee.id), minicbor::to_vec(employee)?);
        self.instance.apply_batch(batch)?;

        Ok(())
    }
}
