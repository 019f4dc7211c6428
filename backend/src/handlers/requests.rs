use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;
use crate::models::decision::DecisionResponse;
use crate::models::leave_request::{CreateLeaveRequest, LeaveRequestResponse, LeaveStatus};
use crate::repositories::RequestListFilters;
use crate::services::NewLeaveRequest;
use crate::state::AppState;
use crate::types::{EmployeeId, LeaveRequestId, LeaveTypeCode};
use crate::utils::calendar::business_days_inclusive;
use crate::utils::time::{day_end_utc, day_start_utc};
use crate::validation::rules::validate_employee_id;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateLeaveRequest>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;

    let request = state
        .leave
        .submit(NewLeaveRequest {
            employee_id: EmployeeId::from(payload.employee_id),
            leave_type_code: LeaveTypeCode::from(payload.leave_type_code),
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
        })
        .await?;
    Ok(Json(request.into()))
}

pub async fn get_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let request = state.leave.request(id).await?;
    Ok(Json(request.into()))
}

pub async fn get_request_decisions(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
) -> Result<Json<Vec<DecisionResponse>>, AppError> {
    let decisions = state.leave.decisions(id).await?;
    Ok(Json(
        decisions.into_iter().map(DecisionResponse::from).collect(),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApprovePayload {
    #[validate(custom(function = "validate_employee_id"))]
    pub approver_id: String,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub comment: String,
}

pub async fn approve_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
    Json(payload): Json<ApprovePayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;

    let request = state
        .leave
        .approve(id, EmployeeId::from(payload.approver_id), payload.comment)
        .await?;
    Ok(Json(request.into()))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectPayload {
    #[validate(custom(function = "validate_employee_id"))]
    pub approver_id: String,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub comment: String,
}

pub async fn reject_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;

    let request = state
        .leave
        .reject(id, EmployeeId::from(payload.approver_id), payload.comment)
        .await?;
    Ok(Json(request.into()))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelPayload {
    #[validate(custom(function = "validate_employee_id"))]
    pub actor_id: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub comment: Option<String>,
}

pub async fn cancel_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
    Json(payload): Json<CancelPayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;

    let request = state
        .leave
        .cancel(id, EmployeeId::from(payload.actor_id), payload.comment)
        .await?;
    Ok(Json(request.into()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PreviewQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days the range would consume if submitted.
    pub business_days: i64,
}

/// Business-day count for a date range, without touching any state.
pub async fn preview_leave_request(
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    Ok(Json(PreviewResponse {
        start_date: query.start_date,
        end_date: query.end_date,
        business_days: business_days_inclusive(query.start_date, query.end_date),
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRequestsQuery {
    pub employee_id: Option<String>,
    pub manager_id: Option<String>,
    pub status: Option<LeaveStatus>,
    /// Inclusive submission-date lower bound, in the configured time zone.
    pub from: Option<NaiveDate>,
    /// Inclusive submission-date upper bound, in the configured time zone.
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn paginate(query: &ListRequestsQuery) -> Result<(i64, i64, i64), AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(per_page))
        .ok_or_else(|| AppError::Validation(vec!["page: is too large".to_string()]))?;
    Ok((page, per_page, offset))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestListResponse {
    pub requests: Vec<LeaveRequestResponse>,
    pub page_info: RequestListPageInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestListPageInfo {
    pub page: i64,
    pub per_page: i64,
    /// Number of requests on this page.
    pub count: usize,
}

pub async fn list_leave_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<RequestListResponse>, AppError> {
    let (page, per_page, offset) = paginate(&query)?;

    let timezone = state.config.time_zone;
    let filters = RequestListFilters {
        employee_id: query.employee_id.map(EmployeeId::from),
        manager_id: query.manager_id.map(EmployeeId::from),
        status: query.status,
        submitted_from: query.from.map(|date| day_start_utc(date, &timezone)),
        submitted_to: query.to.map(|date| day_end_utc(date, &timezone)),
        search: query.search,
    };

    let requests = state.leave.list(&filters, per_page, offset).await?;
    let responses: Vec<LeaveRequestResponse> = requests
        .into_iter()
        .map(LeaveRequestResponse::from)
        .collect();
    let count = responses.len();

    Ok(Json(RequestListResponse {
        requests: responses,
        page_info: RequestListPageInfo {
            page,
            per_page,
            count,
        },
    }))
}
