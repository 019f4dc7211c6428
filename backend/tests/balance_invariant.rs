use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;

use leavedesk_backend::{
    handlers::{admin, employees, requests},
    state::AppState,
};

mod support;

use support::{body_json, grant_days, seed_employee, test_state};

fn test_router_with_state(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/requests",
            axum::routing::post(requests::create_leave_request),
        )
        .route(
            "/api/requests/{id}/approve",
            axum::routing::put(requests::approve_leave_request),
        )
        .route(
            "/api/requests/{id}/cancel",
            axum::routing::put(requests::cancel_leave_request),
        )
        .route(
            "/api/employees/{id}",
            axum::routing::get(employees::get_employee),
        )
        .route(
            "/api/admin/balances",
            axum::routing::put(admin::grant_balance),
        )
        .with_state(state)
}

async fn submit(app: &Router, employee: &str, start: &str, end: &str) -> String {
    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": start,
        "end_date": end
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/requests")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn approve(app: &Router, id: &str, approver: &str) {
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/requests/{}/approve", id))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({"approver_id": approver, "comment": "ok"}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn cancel(app: &Router, id: &str, actor: &str) {
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/requests/{}/cancel", id))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({"actor_id": actor}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn grant(app: &Router, employee: &str, code: &str, days: i64) -> axum::response::Response {
    let request = Request::builder()
        .method("PUT")
        .uri("/api/admin/balances")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "employee_id": employee,
                "leave_type_code": code,
                "accrued_days": days
            })
            .to_string(),
        ))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn al_balance(app: &Router, employee: &str) -> (i64, i64, i64) {
    let request = Request::builder()
        .uri(format!("/api/employees/{}", employee))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let balance = body["balances"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["leave_type_code"] == "AL")
        .expect("AL balance present")
        .clone();
    (
        balance["accrued_days"].as_i64().unwrap(),
        balance["used_days"].as_i64().unwrap(),
        balance["available_days"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_used_days_tracks_currently_approved_requests() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let manager = seed_employee(&state, "Ren Sato").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let first = submit(&app, &employee, "2024-07-15", "2024-07-17").await;
    let second = submit(&app, &employee, "2024-07-22", "2024-07-23").await;
    approve(&app, &first, &manager).await;
    approve(&app, &second, &manager).await;
    assert_eq!(al_balance(&app, &employee).await, (10, 5, 5));

    // Cancelling the first approved request refunds exactly its days.
    cancel(&app, &first, &employee).await;
    assert_eq!(al_balance(&app, &employee).await, (10, 2, 8));
}

#[tokio::test]
async fn test_balance_boundary_exact_fit_succeeds() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 5).await;
    let app = test_router_with_state(state);

    // 2024-01-08 through 2024-01-12 is exactly five business days.
    submit(&app, &employee, "2024-01-08", "2024-01-12").await;
}

#[tokio::test]
async fn test_balance_boundary_one_day_over_fails() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 5).await;
    let app = test_router_with_state(state);

    let payload = json!({
        "employee_id": employee,
        "leave_type_code": "AL",
        "start_date": "2024-01-08",
        "end_date": "2024-01-15"
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/requests")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(body["details"]["requested"], 6);
    assert_eq!(body["details"]["available"], 5);
}

#[tokio::test]
async fn test_grant_cannot_cut_into_used_days() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let manager = seed_employee(&state, "Ren Sato").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let id = submit(&app, &employee, "2024-07-15", "2024-07-17").await;
    approve(&app, &id, &manager).await;

    let response = grant(&app, &employee, "AL", 2).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Exactly the used total is the lowest permitted grant.
    let response = grant(&app, &employee, "AL", 3).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(al_balance(&app, &employee).await, (3, 3, 0));
}

#[tokio::test]
async fn test_grant_cannot_cut_into_pending_reservations() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    submit(&app, &employee, "2024-07-15", "2024-07-17").await;

    // Three days sit on the pending request; the grant may not go below them.
    let response = grant(&app, &employee, "AL", 2).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = grant(&app, &employee, "AL", 3).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_grant_creates_balance_for_new_pair() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let app = test_router_with_state(state);

    let response = grant(&app, &employee, "SL", 8).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["accrued_days"], 8);
    assert_eq!(body["used_days"], 0);
    assert_eq!(body["available_days"], 8);
}

#[tokio::test]
async fn test_grant_for_unknown_leave_type_fails() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let app = test_router_with_state(state);

    let response = grant(&app, &employee, "ZZ", 8).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_LEAVE_TYPE");
}
