//! In-memory [`LeaveStore`] backend.
//!
//! Holds everything behind one `tokio::sync::RwLock`, which makes every
//! grouped write atomic with respect to other store calls. Used by the
//! integration tests and by deployments running without a database.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::decision::Decision;
use crate::models::employee::Employee;
use crate::models::leave_balance::LeaveBalance;
use crate::models::leave_request::{LeaveRequest, LeaveStatus};
use crate::models::leave_type::LeaveType;
use crate::types::{EmployeeId, LeaveRequestId, LeaveTypeCode};

use super::store::{BalanceWrite, LeaveStore, RequestListFilters};

/// First issued employee id is E1001.
const EMPLOYEE_SEQ_BASE: i64 = 1000;

#[derive(Default)]
struct StoreState {
    employees: HashMap<EmployeeId, Employee>,
    leave_types: HashMap<LeaveTypeCode, LeaveType>,
    balances: HashMap<(EmployeeId, LeaveTypeCode), LeaveBalance>,
    requests: HashMap<LeaveRequestId, LeaveRequest>,
    decisions: Vec<Decision>,
}

impl StoreState {
    fn next_employee_id(&self) -> EmployeeId {
        let max = self
            .employees
            .keys()
            .filter_map(|id| id.as_str().strip_prefix('E')?.parse::<i64>().ok())
            .max()
            .unwrap_or(EMPLOYEE_SEQ_BASE);
        EmployeeId::from(format!("E{:04}", max + 1))
    }

    fn matches(&self, request: &LeaveRequest, filters: &RequestListFilters) -> bool {
        if let Some(employee_id) = &filters.employee_id {
            if &request.employee_id != employee_id {
                return false;
            }
        }
        if let Some(manager_id) = &filters.manager_id {
            let reports_to = self
                .employees
                .get(&request.employee_id)
                .and_then(|e| e.manager_id.as_ref());
            if reports_to != Some(manager_id) {
                return false;
            }
        }
        if let Some(status) = filters.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(from) = filters.submitted_from {
            if request.submitted_at < from {
                return false;
            }
        }
        if let Some(to) = filters.submitted_to {
            if request.submitted_at > to {
                return false;
            }
        }
        if let Some(search) = &filters.search {
            let needle = search.to_lowercase();
            let hit = request
                .reason
                .as_deref()
                .is_some_and(|reason| reason.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[derive(Default)]
pub struct MemoryLeaveStore {
    state: RwLock<StoreState>,
}

impl MemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn create_employee(
        &self,
        display_name: String,
        manager_id: Option<EmployeeId>,
        now: DateTime<Utc>,
    ) -> Result<Employee, AppError> {
        let mut state = self.state.write().await;
        let employee = Employee {
            id: state.next_employee_id(),
            display_name,
            manager_id,
            created_at: now,
        };
        state.employees.insert(employee.id.clone(), employee.clone());
        Ok(employee)
    }

    async fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, AppError> {
        let state = self.state.read().await;
        Ok(state.employees.get(id).cloned())
    }

    async fn insert_leave_type(&self, leave_type: &LeaveType) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.leave_types.contains_key(&leave_type.code) {
            return Err(AppError::Conflict(format!(
                "Leave type {} is already defined",
                leave_type.code
            )));
        }
        state
            .leave_types
            .insert(leave_type.code.clone(), leave_type.clone());
        Ok(())
    }

    async fn leave_type(&self, code: &LeaveTypeCode) -> Result<Option<LeaveType>, AppError> {
        let state = self.state.read().await;
        Ok(state.leave_types.get(code).cloned())
    }

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, AppError> {
        let state = self.state.read().await;
        let mut types: Vec<LeaveType> = state.leave_types.values().cloned().collect();
        types.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
        Ok(types)
    }

    async fn balance(
        &self,
        employee_id: &EmployeeId,
        code: &LeaveTypeCode,
    ) -> Result<Option<LeaveBalance>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .balances
            .get(&(employee_id.clone(), code.clone()))
            .cloned())
    }

    async fn balances_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<LeaveBalance>, AppError> {
        let state = self.state.read().await;
        let mut balances: Vec<LeaveBalance> = state
            .balances
            .values()
            .filter(|b| &b.employee_id == employee_id)
            .cloned()
            .collect();
        balances.sort_by(|a, b| a.leave_type_code.as_str().cmp(b.leave_type_code.as_str()));
        Ok(balances)
    }

    async fn put_balance(
        &self,
        balance: &LeaveBalance,
        expected_version: Option<i64>,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let key = (balance.employee_id.clone(), balance.leave_type_code.clone());
        match expected_version {
            None => {
                if state.balances.contains_key(&key) {
                    return Err(AppError::Conflict(
                        "Balance row was created concurrently".to_string(),
                    ));
                }
                let mut row = balance.clone();
                row.version = 0;
                state.balances.insert(key, row);
            }
            Some(expected) => {
                let current = state.balances.get(&key).map(|b| b.version);
                if current != Some(expected) {
                    return Err(AppError::Conflict(
                        "Balance row was modified concurrently".to_string(),
                    ));
                }
                let mut row = balance.clone();
                row.version = expected + 1;
                state.balances.insert(key, row);
            }
        }
        Ok(())
    }

    async fn insert_request(&self, request: &LeaveRequest) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        // Mirror of the database exclusion constraint: no two active
        // requests of one employee may intersect.
        let clash = state.requests.values().any(|existing| {
            existing.employee_id == request.employee_id
                && existing.status.is_active()
                && existing.overlaps_range(request.start_date, request.end_date)
        });
        if clash {
            return Err(AppError::Conflict(
                "A conflicting record already exists".to_string(),
            ));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn request(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, AppError> {
        let state = self.state.read().await;
        Ok(state.requests.get(&id).cloned())
    }

    async fn active_requests(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let state = self.state.read().await;
        let mut requests: Vec<LeaveRequest> = state
            .requests
            .values()
            .filter(|r| &r.employee_id == employee_id && r.status.is_active())
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.submitted_at);
        Ok(requests)
    }

    async fn list_requests(
        &self,
        filters: &RequestListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let state = self.state.read().await;
        let mut requests: Vec<LeaveRequest> = state
            .requests
            .values()
            .filter(|r| state.matches(r, filters))
            .cloned()
            .collect();
        requests.sort_by_key(|r| (Reverse(r.submitted_at), r.id.to_string()));
        Ok(requests
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn commit_decision(
        &self,
        updated: &LeaveRequest,
        expected_status: LeaveStatus,
        decision: &Decision,
        balance_write: Option<BalanceWrite>,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;

        let current = state
            .requests
            .get(&updated.id)
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;
        if current.status != expected_status {
            return Err(AppError::Conflict(
                "Leave request was modified concurrently".to_string(),
            ));
        }

        if let Some(write) = balance_write {
            let key = (
                write.balance.employee_id.clone(),
                write.balance.leave_type_code.clone(),
            );
            let current_version = state.balances.get(&key).map(|b| b.version);
            if current_version != Some(write.expected_version) {
                return Err(AppError::Conflict(
                    "Balance row was modified concurrently".to_string(),
                ));
            }
            let mut row = write.balance;
            row.version = write.expected_version + 1;
            state.balances.insert(key, row);
        }

        state.requests.insert(updated.id, updated.clone());
        state.decisions.push(decision.clone());
        Ok(())
    }

    async fn decisions_for(&self, request_id: LeaveRequestId) -> Result<Vec<Decision>, AppError> {
        let state = self.state.read().await;
        let mut decisions: Vec<Decision> = state
            .decisions
            .iter()
            .filter(|d| d.request_id == request_id)
            .cloned()
            .collect();
        decisions.sort_by_key(|d| d.decided_at);
        Ok(decisions)
    }
}
