#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    handlers::{
        employees::BalanceQuery,
        requests::{
            ApprovePayload, CancelPayload, ListRequestsQuery, PreviewQuery, PreviewResponse,
            RejectPayload, RequestListPageInfo, RequestListResponse,
        },
    },
    models::{
        decision::{DecisionOutcome, DecisionResponse},
        employee::{EmployeeDetailResponse, EmployeeResponse, RegisterEmployee},
        leave_balance::{BalanceResponse, GrantBalance},
        leave_request::{CreateLeaveRequest, LeaveRequestResponse, LeaveStatus},
        leave_type::{CreateLeaveType, LeaveTypeResponse},
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        register_employee_doc,
        employee_detail_doc,
        employee_balance_doc,
        create_request_doc,
        preview_request_doc,
        list_requests_doc,
        request_detail_doc,
        request_decisions_doc,
        approve_request_doc,
        reject_request_doc,
        cancel_request_doc,
        admin_list_leave_types_doc,
        admin_create_leave_type_doc,
        admin_grant_balance_doc
    ),
    components(
        schemas(
            // employees
            RegisterEmployee,
            EmployeeResponse,
            EmployeeDetailResponse,
            // requests
            CreateLeaveRequest,
            LeaveRequestResponse,
            LeaveStatus,
            ApprovePayload,
            RejectPayload,
            CancelPayload,
            PreviewResponse,
            RequestListResponse,
            RequestListPageInfo,
            DecisionResponse,
            DecisionOutcome,
            // admin
            CreateLeaveType,
            LeaveTypeResponse,
            GrantBalance,
            BalanceResponse,
            // errors
            ErrorResponse
        )
    ),
    tags(
        (name = "Employees", description = "従業員登録・残高照会 API"),
        (name = "Requests", description = "休暇申請のライフサイクル API"),
        (name = "Admin", description = "休暇種別・残高付与の管理 API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = RegisterEmployee,
    responses(
        (status = 200, description = "従業員登録完了", body = EmployeeResponse),
        (status = 404, description = "上長が存在しない", body = ErrorResponse)
    ),
    tag = "Employees"
)]
fn register_employee_doc() {}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "従業員ID (E1001 形式)")),
    responses(
        (status = 200, description = "従業員と休暇残高", body = EmployeeDetailResponse),
        (status = 404, description = "従業員が存在しない", body = ErrorResponse)
    ),
    tag = "Employees"
)]
fn employee_detail_doc() {}

#[utoipa::path(
    get,
    path = "/api/employees/{id}/balance",
    params(
        ("id" = String, Path, description = "従業員ID (E1001 形式)"),
        BalanceQuery
    ),
    responses((status = 200, description = "指定種別の休暇残高", body = BalanceResponse)),
    tag = "Employees"
)]
fn employee_balance_doc() {}

#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateLeaveRequest,
    responses(
        (status = 200, description = "申請受付", body = LeaveRequestResponse),
        (status = 400, description = "日付不正・残高不足など", body = ErrorResponse),
        (status = 409, description = "期間重複", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn create_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/requests/preview",
    params(PreviewQuery),
    responses((status = 200, description = "営業日数の見積り", body = PreviewResponse)),
    tag = "Requests"
)]
fn preview_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/requests",
    params(ListRequestsQuery),
    responses((status = 200, description = "申請一覧", body = RequestListResponse)),
    tag = "Requests"
)]
fn list_requests_doc() {}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "申請ID")),
    responses(
        (status = 200, description = "申請詳細", body = LeaveRequestResponse),
        (status = 404, description = "申請が存在しない", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn request_detail_doc() {}

#[utoipa::path(
    get,
    path = "/api/requests/{id}/decisions",
    params(("id" = String, Path, description = "申請ID")),
    responses((status = 200, description = "決裁履歴", body = [DecisionResponse])),
    tag = "Requests"
)]
fn request_decisions_doc() {}

#[utoipa::path(
    put,
    path = "/api/requests/{id}/approve",
    params(("id" = String, Path, description = "申請ID")),
    request_body = ApprovePayload,
    responses(
        (status = 200, description = "承認完了", body = LeaveRequestResponse),
        (status = 400, description = "残高不足", body = ErrorResponse),
        (status = 409, description = "決裁済み・競合", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn approve_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/requests/{id}/reject",
    params(("id" = String, Path, description = "申請ID")),
    request_body = RejectPayload,
    responses(
        (status = 200, description = "却下完了", body = LeaveRequestResponse),
        (status = 409, description = "決裁済み・競合", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn reject_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/requests/{id}/cancel",
    params(("id" = String, Path, description = "申請ID")),
    request_body = CancelPayload,
    responses(
        (status = 200, description = "取消完了", body = LeaveRequestResponse),
        (status = 409, description = "取消不可の状態", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn cancel_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/leave-types",
    responses((status = 200, description = "休暇種別一覧", body = [LeaveTypeResponse])),
    tag = "Admin"
)]
fn admin_list_leave_types_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/leave-types",
    request_body = CreateLeaveType,
    responses(
        (status = 200, description = "休暇種別作成", body = LeaveTypeResponse),
        (status = 409, description = "コード重複", body = ErrorResponse)
    ),
    tag = "Admin"
)]
fn admin_create_leave_type_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/balances",
    request_body = GrantBalance,
    responses(
        (status = 200, description = "残高付与完了", body = BalanceResponse),
        (status = 400, description = "使用済み日数を下回る付与", body = ErrorResponse)
    ),
    tag = "Admin"
)]
fn admin_grant_balance_doc() {}
