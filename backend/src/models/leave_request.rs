use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;
use crate::types::{EmployeeId, LeaveRequestId, LeaveTypeCode};
use crate::validation::rules::{validate_employee_id, validate_leave_type_code};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub employee_id: EmployeeId,
    pub leave_type_code: LeaveTypeCode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Business days covered by the range, frozen at submission time.
    pub days_requested: i64,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub submitted_at: DateTime<Utc>,
    pub decided_by: Option<EmployeeId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Pending and approved requests reserve dates and balance; rejected and
    /// cancelled requests are inert history.
    pub fn is_active(self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

impl LeaveRequest {
    pub fn new(
        employee_id: EmployeeId,
        leave_type_code: LeaveTypeCode,
        start_date: NaiveDate,
        end_date: NaiveDate,
        days_requested: i64,
        reason: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LeaveRequestId::new(),
            employee_id,
            leave_type_code,
            start_date,
            end_date,
            days_requested,
            reason,
            status: LeaveStatus::Pending,
            submitted_at,
            decided_by: None,
            decided_at: None,
            decision_comment: None,
            updated_at: submitted_at,
        }
    }

    /// Moves a pending request to approved. Any other starting state is
    /// rejected without touching the record.
    pub fn approve(
        &mut self,
        decided_by: EmployeeId,
        comment: String,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.status != LeaveStatus::Pending {
            return Err(AppError::InvalidTransition(
                "Invalid or non-pending leave request".to_string(),
            ));
        }
        self.status = LeaveStatus::Approved;
        self.decided_by = Some(decided_by);
        self.decided_at = Some(at);
        self.decision_comment = Some(comment);
        self.updated_at = at;
        Ok(())
    }

    /// Moves a pending request to rejected.
    pub fn reject(
        &mut self,
        decided_by: EmployeeId,
        comment: String,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.status != LeaveStatus::Pending {
            return Err(AppError::InvalidTransition(
                "Invalid or non-pending leave request".to_string(),
            ));
        }
        self.status = LeaveStatus::Rejected;
        self.decided_by = Some(decided_by);
        self.decided_at = Some(at);
        self.decision_comment = Some(comment);
        self.updated_at = at;
        Ok(())
    }

    /// Cancels a pending or approved request and returns the status the
    /// request held before the transition, which callers need to know
    /// whether a balance refund is due.
    pub fn cancel(
        &mut self,
        decided_by: EmployeeId,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<LeaveStatus, AppError> {
        if !self.status.is_active() {
            return Err(AppError::InvalidTransition(
                "Only pending or approved requests can be cancelled".to_string(),
            ));
        }
        let prior = self.status;
        self.status = LeaveStatus::Cancelled;
        self.decided_by = Some(decided_by);
        self.decided_at = Some(at);
        self.decision_comment = comment;
        self.updated_at = at;
        Ok(prior)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, LeaveStatus::Pending)
    }

    /// True when the inclusive date range of this request intersects
    /// `start..=end`.
    pub fn overlaps_range(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveRequest {
    #[validate(custom(function = "validate_employee_id"))]
    pub employee_id: String,
    #[validate(custom(function = "validate_leave_type_code"))]
    pub leave_type_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveRequestResponse {
    pub id: String,
    pub employee_id: String,
    pub leave_type_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i64,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub submitted_at: DateTime<Utc>,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(request: LeaveRequest) -> Self {
        LeaveRequestResponse {
            id: request.id.to_string(),
            employee_id: request.employee_id.to_string(),
            leave_type_code: request.leave_type_code.to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            days_requested: request.days_requested,
            reason: request.reason,
            status: request.status,
            submitted_at: request.submitted_at,
            decided_by: request.decided_by.map(|id| id.to_string()),
            decided_at: request.decided_at,
            decision_comment: request.decision_comment,
        }
    }
}
