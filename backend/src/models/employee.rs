use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::EmployeeId;
use crate::validation::rules::validate_employee_id;

use super::leave_balance::BalanceResponse;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: EmployeeId,
    pub display_name: String,
    pub manager_id: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterEmployee {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub display_name: String,
    /// Existing employee who approves this person's requests, if any.
    #[validate(custom(function = "validate_employee_id"))]
    pub manager_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: String,
    pub display_name: String,
    pub manager_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        EmployeeResponse {
            id: employee.id.to_string(),
            display_name: employee.display_name,
            manager_id: employee.manager_id.map(|id| id.to_string()),
            created_at: employee.created_at,
        }
    }
}

/// Employee card with the per-type balances attached.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeDetailResponse {
    #[serde(flatten)]
    pub employee: EmployeeResponse,
    pub balances: Vec<BalanceResponse>,
}
