use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::LeaveTypeCode;
use crate::validation::rules::validate_leave_type_code;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaveType {
    pub code: LeaveTypeCode,
    pub description: String,
    /// Upper bound on business days a single request may cover. `None`
    /// means the type is uncapped.
    pub max_days_per_request: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl LeaveType {
    pub fn new(
        code: LeaveTypeCode,
        description: String,
        max_days_per_request: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            description,
            max_days_per_request,
            created_at,
        }
    }

    pub fn allows_duration(&self, days: i64) -> bool {
        self.max_days_per_request.is_none_or(|cap| days <= cap)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveType {
    #[validate(custom(function = "validate_leave_type_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub description: String,
    #[validate(range(min = 1, message = "must be a positive number of days"))]
    pub max_days_per_request: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveTypeResponse {
    pub code: String,
    pub description: String,
    pub max_days_per_request: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<LeaveType> for LeaveTypeResponse {
    fn from(leave_type: LeaveType) -> Self {
        LeaveTypeResponse {
            code: leave_type.code.to_string(),
            description: leave_type.description,
            max_days_per_request: leave_type.max_days_per_request,
            created_at: leave_type.created_at,
        }
    }
}
