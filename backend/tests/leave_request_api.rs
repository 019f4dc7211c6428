use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;

use leavedesk_backend::{handlers::requests, state::AppState};

mod support;

use support::{body_json, grant_days, seed_employee, test_state};

fn test_router_with_state(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/requests",
            axum::routing::post(requests::create_leave_request),
        )
        .route(
            "/api/requests/preview",
            axum::routing::get(requests::preview_leave_request),
        )
        .route(
            "/api/requests/{id}",
            axum::routing::get(requests::get_leave_request),
        )
        .with_state(state)
}

fn post_request(payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/requests")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_leave_request_succeeds() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17",
        "reason": "Summer vacation"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["employee_id"], employee);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["days_requested"], 3);
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_leave_request_with_invalid_date_range_fails() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-20",
        "end_date": "2024-07-15"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn test_weekend_only_request_fails() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    // 2024-07-13 and 2024-07-14 are a Saturday and Sunday.
    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-13",
        "end_date": "2024-07-14"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn test_unknown_leave_type_fails() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "XX",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_LEAVE_TYPE");
}

#[tokio::test]
async fn test_insufficient_balance_reports_requested_and_available() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 2).await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(body["details"]["requested"], 3);
    assert_eq!(body["details"]["available"], 2);
}

#[tokio::test]
async fn test_overlapping_request_conflicts() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let first = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17"
    });
    let response = app.clone().oneshot(post_request(first)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Shares the boundary day 2024-07-17 with the pending request.
    let overlapping = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-17",
        "end_date": "2024-07-19"
    });
    let response = app
        .clone()
        .oneshot(post_request(overlapping))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "OVERLAPPING_REQUEST");

    let disjoint = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-18",
        "end_date": "2024-07-19"
    });
    let response = app.oneshot(post_request(disjoint)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_per_type_cap_rejects_long_request() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "CL", 10).await;
    let app = test_router_with_state(state);

    // 2024-07-01 through 2024-07-09 spans 7 business days; CL allows 5.
    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "CL",
        "start_date": "2024-07-01",
        "end_date": "2024-07-09"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_LEAVE_TYPE");
}

#[tokio::test]
async fn test_create_for_unknown_employee_fails() {
    let state = test_state().await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": "E9999",
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_employee_id_fails_validation() {
    let state = test_state().await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": "staff-1",
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17"
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["errors"].as_array().is_some());
}

#[tokio::test]
async fn test_overlong_reason_fails_validation() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17",
        "reason": "x".repeat(501)
    });
    let response = app.oneshot(post_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_preview_counts_business_days() {
    let state = test_state().await;
    let app = test_router_with_state(state);

    let request = Request::builder()
        .uri("/api/requests/preview?start_date=2024-01-08&end_date=2024-01-12")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["business_days"], 5);
}

#[tokio::test]
async fn test_get_request_detail() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-07-15",
        "end_date": "2024-07-17"
    });
    let response = app.clone().oneshot(post_request(payload)).await.unwrap();
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/api/requests/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["leave_type_code"], "AL");

    let request = Request::builder()
        .uri(format!("/api/requests/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
