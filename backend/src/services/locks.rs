//! Per-employee serialization of lifecycle writes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::types::EmployeeId;

/// Registry of per-employee async locks.
///
/// Every write touching one employee's requests or balances runs under that
/// employee's lock, which serializes the read-validate-write sequence inside
/// this process. The store-level status and version guards stay in place for
/// writers outside it.
#[derive(Default)]
pub struct EmployeeLocks {
    locks: DashMap<EmployeeId, Arc<Mutex<()>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `employee_id`, creating it on first use.
    pub async fn acquire(&self, employee_id: &EmployeeId) -> OwnedMutexGuard<()> {
        let lock = {
            let entry = self.locks.entry(employee_id.clone()).or_default();
            Arc::clone(&entry)
        };
        lock.lock_owned().await
    }
}
