//! Storage trait for the leave lifecycle, for dependency injection and
//! testing.
//!
//! Two backends implement it: [`MemoryLeaveStore`](super::MemoryLeaveStore)
//! for tests and single-process deployments, and
//! [`PgLeaveStore`](super::PgLeaveStore) for PostgreSQL. Use
//! `MockLeaveStore` in unit tests to script storage behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::decision::Decision;
use crate::models::employee::Employee;
use crate::models::leave_balance::LeaveBalance;
use crate::models::leave_request::{LeaveRequest, LeaveStatus};
use crate::models::leave_type::LeaveType;
use crate::types::{EmployeeId, LeaveRequestId, LeaveTypeCode};

/// Filters for request listings. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestListFilters {
    /// Requests submitted by this employee.
    pub employee_id: Option<EmployeeId>,
    /// Requests submitted by any direct report of this manager.
    pub manager_id: Option<EmployeeId>,
    pub status: Option<LeaveStatus>,
    /// Inclusive lower bound on submission time.
    pub submitted_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on submission time.
    pub submitted_to: Option<DateTime<Utc>>,
    /// Case-insensitive match against the request reason.
    pub search: Option<String>,
}

/// Guarded balance write attached to a decision commit.
///
/// `balance` carries the post-mutation row; `expected_version` is the version
/// the row held when it was read. The store refuses the whole commit when the
/// stored version no longer matches.
#[derive(Debug, Clone)]
pub struct BalanceWrite {
    pub balance: LeaveBalance,
    pub expected_version: i64,
}

/// Persistence operations for employees, leave reference data, balances,
/// requests, and the decision log.
///
/// Write methods that carry an `expected_version` or expected status are
/// compare-and-swap guards: when the guard fails the method returns
/// [`AppError::Conflict`] and leaves storage untouched. Grouped writes
/// (`commit_decision`) apply all of their parts or none.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Creates an employee, issuing the next free `E`-prefixed identifier.
    async fn create_employee(
        &self,
        display_name: String,
        manager_id: Option<EmployeeId>,
        now: DateTime<Utc>,
    ) -> Result<Employee, AppError>;

    async fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, AppError>;

    /// Adds a leave type. Fails with [`AppError::Conflict`] when the code is
    /// already defined.
    async fn insert_leave_type(&self, leave_type: &LeaveType) -> Result<(), AppError>;

    async fn leave_type(&self, code: &LeaveTypeCode) -> Result<Option<LeaveType>, AppError>;

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, AppError>;

    async fn balance(
        &self,
        employee_id: &EmployeeId,
        code: &LeaveTypeCode,
    ) -> Result<Option<LeaveBalance>, AppError>;

    async fn balances_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<LeaveBalance>, AppError>;

    /// Writes a balance row. `expected_version` of `None` asserts the row is
    /// new; `Some(v)` asserts the stored row still carries version `v`.
    async fn put_balance(
        &self,
        balance: &LeaveBalance,
        expected_version: Option<i64>,
    ) -> Result<(), AppError>;

    /// Inserts a freshly submitted request.
    async fn insert_request(&self, request: &LeaveRequest) -> Result<(), AppError>;

    async fn request(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, AppError>;

    /// All pending and approved requests of one employee, any leave type.
    async fn active_requests(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<LeaveRequest>, AppError>;

    /// Requests matching `filters`, newest submission first.
    async fn list_requests(
        &self,
        filters: &RequestListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequest>, AppError>;

    /// Applies one lifecycle decision as a unit: flips the request from
    /// `expected_status` to its new state, appends the decision log entry,
    /// and applies the balance write when one is attached.
    async fn commit_decision(
        &self,
        updated: &LeaveRequest,
        expected_status: LeaveStatus,
        decision: &Decision,
        balance_write: Option<BalanceWrite>,
    ) -> Result<(), AppError>;

    /// Decision log of one request, oldest entry first.
    async fn decisions_for(&self, request_id: LeaveRequestId) -> Result<Vec<Decision>, AppError>;
}
