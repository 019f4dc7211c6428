use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::models::employee::{EmployeeDetailResponse, EmployeeResponse, RegisterEmployee};
use crate::models::leave_balance::BalanceResponse;
use crate::state::AppState;
use crate::types::{EmployeeId, LeaveTypeCode};
use crate::validation::Validate;

pub async fn register_employee(
    State(state): State<AppState>,
    Json(payload): Json<RegisterEmployee>,
) -> Result<Json<EmployeeResponse>, AppError> {
    payload.validate()?;

    let employee = state
        .directory
        .register_employee(
            payload.display_name,
            payload.manager_id.map(EmployeeId::from),
        )
        .await?;
    Ok(Json(employee.into()))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeDetailResponse>, AppError> {
    let (employee, balances) = state
        .directory
        .employee_detail(&EmployeeId::from(id))
        .await?;
    Ok(Json(EmployeeDetailResponse {
        employee: employee.into(),
        balances: balances.into_iter().map(BalanceResponse::from).collect(),
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceQuery {
    pub leave_type: String,
}

pub async fn get_employee_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state
        .directory
        .available_balance(
            &EmployeeId::from(id),
            &LeaveTypeCode::from(query.leave_type),
        )
        .await?;
    Ok(Json(balance.into()))
}
