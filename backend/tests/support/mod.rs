#![allow(dead_code)]
use std::sync::Arc;

use chrono::Utc;
use leavedesk_backend::{
    config::Config,
    models::leave_type::LeaveType,
    repositories::{LeaveStore, MemoryLeaveStore},
    state::AppState,
    types::{EmployeeId, LeaveTypeCode},
};

pub fn test_config() -> Config {
    Config::default()
}

/// Fresh application state over the in-memory store, seeded with the same
/// leave type catalogue the migrations install: AL (uncapped), CL (5 days
/// per request), SL (10 days per request).
pub async fn test_state() -> AppState {
    let store = MemoryLeaveStore::new();
    let defaults = [
        ("AL", "Annual leave", None),
        ("CL", "Casual leave", Some(5)),
        ("SL", "Sick leave", Some(10)),
    ];
    for (code, description, cap) in defaults {
        let leave_type = LeaveType::new(
            LeaveTypeCode::from(code),
            description.to_string(),
            cap,
            Utc::now(),
        );
        store
            .insert_leave_type(&leave_type)
            .await
            .expect("seed leave type");
    }
    AppState::new(Arc::new(store), test_config())
}

/// Registers an employee and returns its generated id (`E1001` style).
pub async fn seed_employee(state: &AppState, display_name: &str) -> String {
    state
        .directory
        .register_employee(display_name.to_string(), None)
        .await
        .expect("register employee")
        .id
        .to_string()
}

pub async fn seed_employee_with_manager(
    state: &AppState,
    display_name: &str,
    manager_id: &str,
) -> String {
    state
        .directory
        .register_employee(
            display_name.to_string(),
            Some(EmployeeId::from(manager_id)),
        )
        .await
        .expect("register employee")
        .id
        .to_string()
}

/// Sets the accrued total for an (employee, leave type) pair.
pub async fn grant_days(state: &AppState, employee_id: &str, code: &str, days: i64) {
    state
        .directory
        .grant_balance(
            EmployeeId::from(employee_id),
            LeaveTypeCode::from(code),
            days,
        )
        .await
        .expect("grant balance");
}

/// Reads a response body to completion and parses it as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}
