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
            "/api/requests/{id}/approve",
            axum::routing::put(requests::approve_leave_request),
        )
        .route(
            "/api/requests/{id}/cancel",
            axum::routing::put(requests::cancel_leave_request),
        )
        .with_state(state)
}

fn submit_request(employee: &str, start: &str, end: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/requests")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "employee_id": employee,
                "leave_type_code": "AL",
                "start_date": start,
                "end_date": end
            })
            .to_string(),
        ))
        .unwrap()
}

fn put_request(uri: String, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_submits_never_overbook_the_balance() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    grant_days(&state, &employee, "AL", 4).await;
    let app = test_router_with_state(state);

    // Disjoint windows of three business days each; only one fits in four.
    let (first, second) = tokio::join!(
        app.clone()
            .oneshot(submit_request(&employee, "2024-07-15", "2024-07-17")),
        app.clone()
            .oneshot(submit_request(&employee, "2024-07-22", "2024-07-24")),
    );
    let statuses = [first.unwrap().status(), second.unwrap().status()];

    let successes = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let rejections = statuses
        .iter()
        .filter(|s| **s == StatusCode::BAD_REQUEST)
        .count();
    assert_eq!(successes, 1, "statuses: {statuses:?}");
    assert_eq!(rejections, 1, "statuses: {statuses:?}");
}

#[tokio::test]
async fn test_concurrent_approvals_decide_once() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let manager = seed_employee(&state, "Ren Sato").await;
    let other = seed_employee(&state, "Yui Aoki").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state);

    let response = app
        .clone()
        .oneshot(submit_request(&employee, "2024-07-15", "2024-07-17"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let (first, second) = tokio::join!(
        app.clone().oneshot(put_request(
            format!("/api/requests/{}/approve", id),
            json!({"approver_id": manager, "comment": "ok"}),
        )),
        app.clone().oneshot(put_request(
            format!("/api/requests/{}/approve", id),
            json!({"approver_id": other, "comment": "ok"}),
        )),
    );
    let statuses = [first.unwrap().status(), second.unwrap().status()];

    let successes = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses
        .iter()
        .filter(|s| **s == StatusCode::CONFLICT)
        .count();
    assert_eq!(successes, 1, "statuses: {statuses:?}");
    assert_eq!(conflicts, 1, "statuses: {statuses:?}");
}

#[tokio::test]
async fn test_concurrent_cancels_refund_once() {
    let state = test_state().await;
    let employee = seed_employee(&state, "Mika Tan").await;
    let manager = seed_employee(&state, "Ren Sato").await;
    grant_days(&state, &employee, "AL", 10).await;
    let app = test_router_with_state(state.clone());

    let response = app
        .clone()
        .oneshot(submit_request(&employee, "2024-07-15", "2024-07-17"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(put_request(
            format!("/api/requests/{}/approve", id),
            json!({"approver_id": manager, "comment": "ok"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (first, second) = tokio::join!(
        app.clone().oneshot(put_request(
            format!("/api/requests/{}/cancel", id),
            json!({"actor_id": employee}),
        )),
        app.clone().oneshot(put_request(
            format!("/api/requests/{}/cancel", id),
            json!({"actor_id": manager}),
        )),
    );
    let statuses = [first.unwrap().status(), second.unwrap().status()];

    let successes = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(successes, 1, "statuses: {statuses:?}");

    // Exactly one refund happened.
    let balance = state
        .directory
        .available_balance(
            &leavedesk_backend::types::EmployeeId::from(employee.as_str()),
            &leavedesk_backend::types::LeaveTypeCode::from("AL"),
        )
        .await
        .unwrap();
    assert_eq!(balance.used_days, 0);
    assert_eq!(balance.available(), 10);
}
