use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Wire shape for every error the API returns.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Start date after end date, or a range containing no business days.
    #[error("{0}")]
    InvalidDateRange(String),
    /// Unknown leave type code, or the per-type maximum was exceeded.
    #[error("{0}")]
    InvalidLeaveType(String),
    /// The request asks for more days than the employee has available.
    #[error("Insufficient balance: requested {requested} day(s), available {available}")]
    InsufficientBalance { requested: i64, available: i64 },
    /// The date range intersects an existing pending or approved request.
    #[error("{0}")]
    OverlappingRequest(String),
    /// A lifecycle action was attempted from a state that does not allow it.
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    NotFound(String),
    /// A concurrent update won; retried internally before surfacing.
    #[error("{0}")]
    Conflict(String),
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, details) = match self {
            AppError::InvalidDateRange(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                "INVALID_DATE_RANGE".to_string(),
                None,
            ),
            AppError::InvalidLeaveType(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                "INVALID_LEAVE_TYPE".to_string(),
                None,
            ),
            AppError::InsufficientBalance {
                requested,
                available,
            } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Insufficient balance: requested {} day(s), available {}",
                    requested, available
                ),
                "INSUFFICIENT_BALANCE".to_string(),
                Some(serde_json::json!({
                    "requested": requested,
                    "available": available,
                })),
            ),
            AppError::OverlappingRequest(msg) => (
                StatusCode::CONFLICT,
                msg,
                "OVERLAPPING_REQUEST".to_string(),
                None,
            ),
            AppError::InvalidTransition(msg) => (
                StatusCode::CONFLICT,
                msg,
                "INVALID_TRANSITION".to_string(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND".to_string(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT".to_string(), None),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // 23505 unique_violation, 23P01 exclusion_violation: both mean a
                // concurrent writer got there first.
                Some("23505") | Some("23P01") => {
                    AppError::Conflict("A conflicting record already exists".to_string())
                }
                _ => AppError::InternalServerError(err.into()),
            },
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let detail = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, detail)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn app_error_into_response_maps_status_and_body() {
        let response = AppError::InvalidDateRange("bad range".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "bad range");
        assert_eq!(json["code"], "INVALID_DATE_RANGE");

        let response = AppError::InvalidLeaveType("unknown code".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["code"], "INVALID_LEAVE_TYPE");

        let response = AppError::OverlappingRequest("overlap".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["code"], "OVERLAPPING_REQUEST");

        let response = AppError::InvalidTransition("already decided".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["code"], "INVALID_TRANSITION");

        let response = AppError::NotFound("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["error"], "missing");
        assert_eq!(json["code"], "NOT_FOUND");

        let response = AppError::Conflict("try again".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn insufficient_balance_carries_structured_details() {
        let response = AppError::InsufficientBalance {
            requested: 6,
            available: 5,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["code"], "INSUFFICIENT_BALANCE");
        assert_eq!(json["details"]["requested"], 6);
        assert_eq!(json["details"]["available"], 5);
    }

    #[tokio::test]
    async fn app_error_validation_includes_details() {
        let response = AppError::Validation(vec!["field: invalid".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["errors"][0], "field: invalid");
    }

    #[tokio::test]
    async fn app_error_internal_maps_to_generic_message() {
        let response = AppError::InternalServerError(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "INTERNAL_SERVER_ERROR");
        assert!(json["details"].is_null());
    }
}
