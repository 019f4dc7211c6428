use axum::{extract::State, Json};

use crate::error::AppError;
use crate::models::leave_balance::{BalanceResponse, GrantBalance};
use crate::models::leave_type::{CreateLeaveType, LeaveTypeResponse};
use crate::state::AppState;
use crate::types::{EmployeeId, LeaveTypeCode};
use crate::validation::Validate;

pub async fn list_leave_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaveTypeResponse>>, AppError> {
    let leave_types = state.directory.list_leave_types().await?;
    Ok(Json(
        leave_types.into_iter().map(LeaveTypeResponse::from).collect(),
    ))
}

pub async fn create_leave_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateLeaveType>,
) -> Result<Json<LeaveTypeResponse>, AppError> {
    payload.validate()?;

    let leave_type = state
        .directory
        .create_leave_type(
            LeaveTypeCode::from(payload.code),
            payload.description,
            payload.max_days_per_request,
        )
        .await?;
    Ok(Json(leave_type.into()))
}

pub async fn grant_balance(
    State(state): State<AppState>,
    Json(payload): Json<GrantBalance>,
) -> Result<Json<BalanceResponse>, AppError> {
    payload.validate()?;

    let balance = state
        .directory
        .grant_balance(
            EmployeeId::from(payload.employee_id),
            LeaveTypeCode::from(payload.leave_type_code),
            payload.accrued_days,
        )
        .await?;
    Ok(Json(balance.into()))
}
