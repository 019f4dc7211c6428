use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;
use crate::types::{EmployeeId, LeaveTypeCode};
use crate::validation::rules::{validate_employee_id, validate_leave_type_code};

/// Per-employee, per-type ledger row.
///
/// `accrued_days` is what the employee has been granted; `used_days` is the
/// sum of days on currently approved requests. All mutation goes through the
/// methods below so the `used_days <= accrued_days` and non-negativity rules
/// hold at every step. `version` backs the compare-and-swap write guard in
/// the stores; only stores advance it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveBalance {
    pub employee_id: EmployeeId,
    pub leave_type_code: LeaveTypeCode,
    pub accrued_days: i64,
    pub used_days: i64,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    pub fn new(
        employee_id: EmployeeId,
        leave_type_code: LeaveTypeCode,
        accrued_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            employee_id,
            leave_type_code,
            accrued_days,
            used_days: 0,
            version: 0,
            updated_at: now,
        }
    }

    /// Days still available to new requests.
    pub fn available(&self) -> i64 {
        self.accrued_days - self.used_days
    }

    /// Consumes `days` from the available balance when a request is approved.
    pub fn debit(&mut self, days: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        if days > self.available() {
            return Err(AppError::InsufficientBalance {
                requested: days,
                available: self.available().max(0),
            });
        }
        self.used_days += days;
        self.updated_at = now;
        Ok(())
    }

    /// Returns `days` to the available balance when an approved request is
    /// cancelled. Crediting more than was ever used means the ledger and the
    /// request log disagree, which no sequence of API calls can produce.
    pub fn credit(&mut self, days: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        if days > self.used_days {
            return Err(AppError::InternalServerError(anyhow!(
                "balance credit of {} day(s) exceeds used total {} for {} / {}",
                days,
                self.used_days,
                self.employee_id,
                self.leave_type_code,
            )));
        }
        self.used_days -= days;
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the accrued total. `reserved_days` is the sum of days on the
    /// employee's pending requests for this type; the new total may not cut
    /// into days that are already used or promised.
    pub fn regrant(
        &mut self,
        accrued_days: i64,
        reserved_days: i64,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if accrued_days < self.used_days + reserved_days {
            return Err(AppError::Validation(vec![format!(
                "accrued_days: cannot be reduced below {} day(s) already used or reserved",
                self.used_days + reserved_days
            )]));
        }
        self.accrued_days = accrued_days;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GrantBalance {
    #[validate(custom(function = "validate_employee_id"))]
    pub employee_id: String,
    #[validate(custom(function = "validate_leave_type_code"))]
    pub leave_type_code: String,
    /// New accrued total for the pair, replacing the previous grant.
    #[validate(range(min = 0, message = "must not be negative"))]
    pub accrued_days: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub employee_id: String,
    pub leave_type_code: String,
    pub accrued_days: i64,
    pub used_days: i64,
    pub available_days: i64,
}

impl From<LeaveBalance> for BalanceResponse {
    fn from(balance: LeaveBalance) -> Self {
        let available_days = balance.available();
        BalanceResponse {
            employee_id: balance.employee_id.to_string(),
            leave_type_code: balance.leave_type_code.to_string(),
            accrued_days: balance.accrued_days,
            used_days: balance.used_days,
            available_days,
        }
    }
}
