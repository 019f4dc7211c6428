//! Employee directory and balance administration: registration, leave type
//! catalogue management, and balance grants.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::AppError;
use crate::models::employee::Employee;
use crate::models::leave_balance::LeaveBalance;
use crate::models::leave_type::LeaveType;
use crate::types::{EmployeeId, LeaveTypeCode};

use super::locks::EmployeeLocks;
use super::retry_on_conflict;
use crate::repositories::LeaveStore;

pub struct DirectoryService {
    store: Arc<dyn LeaveStore>,
    locks: Arc<EmployeeLocks>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn LeaveStore>, locks: Arc<EmployeeLocks>) -> Self {
        Self { store, locks }
    }

    /// Registers an employee and assigns the next id in the E-prefixed
    /// sequence. Two concurrent registrations can race for the same id, so
    /// the insert retries on conflict.
    pub async fn register_employee(
        &self,
        display_name: String,
        manager_id: Option<EmployeeId>,
    ) -> Result<Employee, AppError> {
        if let Some(ref manager) = manager_id {
            self.store.employee(manager).await?.ok_or_else(|| {
                AppError::NotFound(format!("Manager {} not found", manager))
            })?;
        }

        let employee = retry_on_conflict("register_employee", || {
            self.store
                .create_employee(display_name.clone(), manager_id.clone(), Utc::now())
        })
        .await?;

        info!(employee = %employee.id, "employee registered");
        Ok(employee)
    }

    /// An employee together with every balance row it holds.
    pub async fn employee_detail(
        &self,
        id: &EmployeeId,
    ) -> Result<(Employee, Vec<LeaveBalance>), AppError> {
        let employee = self
            .store
            .employee(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;
        let balances = self.store.balances_for_employee(id).await?;
        Ok((employee, balances))
    }

    /// Remaining days for one employee and leave type. An employee with no
    /// balance row simply has nothing available yet.
    pub async fn available_balance(
        &self,
        employee_id: &EmployeeId,
        leave_type_code: &LeaveTypeCode,
    ) -> Result<LeaveBalance, AppError> {
        self.store
            .employee(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;
        match self.store.balance(employee_id, leave_type_code).await? {
            Some(balance) => Ok(balance),
            None => Ok(LeaveBalance::new(
                employee_id.clone(),
                leave_type_code.clone(),
                0,
                Utc::now(),
            )),
        }
    }

    /// Adds a leave type to the catalogue. Duplicate codes are a conflict,
    /// not a retryable race.
    pub async fn create_leave_type(
        &self,
        code: LeaveTypeCode,
        description: String,
        max_days_per_request: Option<i64>,
    ) -> Result<LeaveType, AppError> {
        if self.store.leave_type(&code).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Leave type {} is already defined",
                code
            )));
        }

        let leave_type = LeaveType::new(code, description, max_days_per_request, Utc::now());
        self.store.insert_leave_type(&leave_type).await?;

        info!(leave_type = %leave_type.code, "leave type created");
        Ok(leave_type)
    }

    pub async fn list_leave_types(&self) -> Result<Vec<LeaveType>, AppError> {
        self.store.list_leave_types().await
    }

    /// Sets the accrued total for one employee and leave type. The new total
    /// may not drop below days already used plus days reserved by pending
    /// requests of that type.
    pub async fn grant_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_code: LeaveTypeCode,
        accrued_days: i64,
    ) -> Result<LeaveBalance, AppError> {
        let _guard = self.locks.acquire(&employee_id).await;
        retry_on_conflict("grant_balance", || {
            self.try_grant(&employee_id, &leave_type_code, accrued_days)
        })
        .await
    }

    async fn try_grant(
        &self,
        employee_id: &EmployeeId,
        leave_type_code: &LeaveTypeCode,
        accrued_days: i64,
    ) -> Result<LeaveBalance, AppError> {
        let now = Utc::now();

        self.store
            .employee(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;
        self.store
            .leave_type(leave_type_code)
            .await?
            .ok_or_else(|| {
                AppError::InvalidLeaveType(format!("Unknown leave type {}", leave_type_code))
            })?;

        let reserved: i64 = self
            .store
            .active_requests(employee_id)
            .await?
            .iter()
            .filter(|r| r.is_pending() && r.leave_type_code == *leave_type_code)
            .map(|r| r.days_requested)
            .sum();

        let balance = match self.store.balance(employee_id, leave_type_code).await? {
            Some(mut balance) => {
                let expected_version = balance.version;
                balance.regrant(accrued_days, reserved, now)?;
                self.store
                    .put_balance(&balance, Some(expected_version))
                    .await?;
                balance
            }
            None => {
                let mut balance = LeaveBalance::new(
                    employee_id.clone(),
                    leave_type_code.clone(),
                    0,
                    now,
                );
                balance.regrant(accrued_days, reserved, now)?;
                self.store.put_balance(&balance, None).await?;
                balance
            }
        };

        info!(
            employee = %employee_id,
            leave_type = %leave_type_code,
            accrued = accrued_days,
            "balance granted"
        );
        Ok(balance)
    }
}
