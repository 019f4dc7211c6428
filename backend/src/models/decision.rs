use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{DecisionId, EmployeeId, LeaveRequestId};

/// One entry in the append-only decision log of a request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Decision {
    pub id: DecisionId,
    pub request_id: LeaveRequestId,
    pub decided_by: EmployeeId,
    pub outcome: DecisionOutcome,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    Cancelled,
}

impl Decision {
    pub fn new(
        request_id: LeaveRequestId,
        decided_by: EmployeeId,
        outcome: DecisionOutcome,
        comment: Option<String>,
        decided_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DecisionId::new(),
            request_id,
            decided_by,
            outcome,
            comment,
            decided_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub id: String,
    pub request_id: String,
    pub decided_by: String,
    pub outcome: DecisionOutcome,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl From<Decision> for DecisionResponse {
    fn from(decision: Decision) -> Self {
        DecisionResponse {
            id: decision.id.to_string(),
            request_id: decision.request_id.to_string(),
            decided_by: decision.decided_by.to_string(),
            outcome: decision.outcome,
            comment: decision.comment,
            decided_at: decision.decided_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_outcome_serde_snake_case() {
        let outcome: DecisionOutcome = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(outcome, DecisionOutcome::Cancelled);
        let value = serde_json::to_value(DecisionOutcome::Approved).unwrap();
        assert_eq!(value, serde_json::json!("approved"));
    }
}
