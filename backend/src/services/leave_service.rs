//! Leave request lifecycle: submission, approval, rejection, cancellation,
//! and the request queries. All writes run under the submitting employee's
//! lock and retry transparently when a store guard reports a lost race.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::AppError;
use crate::models::decision::{Decision, DecisionOutcome};
use crate::models::leave_request::{LeaveRequest, LeaveStatus};
use crate::repositories::{BalanceWrite, LeaveStore, RequestListFilters};
use crate::types::{EmployeeId, LeaveRequestId};
use crate::utils::calendar::business_days_inclusive;

use super::locks::EmployeeLocks;
use super::retry_on_conflict;

/// Typed submission input, assembled by the HTTP layer from the wire payload.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: EmployeeId,
    pub leave_type_code: crate::types::LeaveTypeCode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    locks: Arc<EmployeeLocks>,
}

impl LeaveService {
    pub fn new(store: Arc<dyn LeaveStore>, locks: Arc<EmployeeLocks>) -> Self {
        Self { store, locks }
    }

    /// Submits a new request. Validation runs in a fixed order and the first
    /// failure wins: date order, business-day count, leave type and its cap,
    /// balance, overlap.
    pub async fn submit(&self, input: NewLeaveRequest) -> Result<LeaveRequest, AppError> {
        let _guard = self.locks.acquire(&input.employee_id).await;
        retry_on_conflict("submit", || self.try_submit(&input)).await
    }

    async fn try_submit(&self, input: &NewLeaveRequest) -> Result<LeaveRequest, AppError> {
        let now = Utc::now();

        self.store
            .employee(&input.employee_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Employee {} not found", input.employee_id))
            })?;

        if input.start_date > input.end_date {
            return Err(AppError::InvalidDateRange(
                "End date must be on or after start date".to_string(),
            ));
        }

        let days_requested = business_days_inclusive(input.start_date, input.end_date);
        if days_requested == 0 {
            return Err(AppError::InvalidDateRange(
                "Leave request must cover at least one business day".to_string(),
            ));
        }

        let leave_type = self
            .store
            .leave_type(&input.leave_type_code)
            .await?
            .ok_or_else(|| {
                AppError::InvalidLeaveType(format!(
                    "Unknown leave type {}",
                    input.leave_type_code
                ))
            })?;
        if !leave_type.allows_duration(days_requested) {
            return Err(AppError::InvalidLeaveType(format!(
                "Leave type {} allows at most {} day(s) per request",
                leave_type.code,
                leave_type.max_days_per_request.unwrap_or(0)
            )));
        }

        let active = self.store.active_requests(&input.employee_id).await?;

        // Days on pending requests of the same type are spoken for: without
        // counting them, two disjoint submissions could both pass the balance
        // check and later both be approved.
        let reserved: i64 = active
            .iter()
            .filter(|r| r.is_pending() && r.leave_type_code == input.leave_type_code)
            .map(|r| r.days_requested)
            .sum();
        let balance = self
            .store
            .balance(&input.employee_id, &input.leave_type_code)
            .await?;
        let available = balance.map(|b| b.available()).unwrap_or(0) - reserved;
        if available < days_requested {
            return Err(AppError::InsufficientBalance {
                requested: days_requested,
                available: available.max(0),
            });
        }

        if let Some(existing) = active
            .iter()
            .find(|r| r.overlaps_range(input.start_date, input.end_date))
        {
            return Err(AppError::OverlappingRequest(format!(
                "Leave request overlaps an existing request from {} to {}",
                existing.start_date, existing.end_date
            )));
        }

        let request = LeaveRequest::new(
            input.employee_id.clone(),
            input.leave_type_code.clone(),
            input.start_date,
            input.end_date,
            days_requested,
            input.reason.clone(),
            now,
        );
        self.store.insert_request(&request).await?;

        info!(
            request_id = %request.id,
            employee = %request.employee_id,
            leave_type = %request.leave_type_code,
            days = days_requested,
            "leave request submitted"
        );
        Ok(request)
    }

    /// Approves a pending request and debits the employee's balance.
    pub async fn approve(
        &self,
        request_id: LeaveRequestId,
        approver_id: EmployeeId,
        comment: String,
    ) -> Result<LeaveRequest, AppError> {
        let employee_id = self.request_employee(request_id).await?;
        let _guard = self.locks.acquire(&employee_id).await;
        retry_on_conflict("approve", || {
            self.try_approve(request_id, &approver_id, &comment)
        })
        .await
    }

    async fn try_approve(
        &self,
        request_id: LeaveRequestId,
        approver_id: &EmployeeId,
        comment: &str,
    ) -> Result<LeaveRequest, AppError> {
        let now = Utc::now();
        self.ensure_employee(approver_id).await?;

        let mut request = self.load_request(request_id).await?;
        request.approve(approver_id.clone(), comment.to_string(), now)?;

        let mut balance = self
            .store
            .balance(&request.employee_id, &request.leave_type_code)
            .await?
            .ok_or_else(|| {
                AppError::InternalServerError(anyhow!(
                    "balance row missing for {} / {}",
                    request.employee_id,
                    request.leave_type_code
                ))
            })?;
        let expected_version = balance.version;
        balance.debit(request.days_requested, now)?;

        let decision = Decision::new(
            request_id,
            approver_id.clone(),
            DecisionOutcome::Approved,
            Some(comment.to_string()),
            now,
        );
        self.store
            .commit_decision(
                &request,
                LeaveStatus::Pending,
                &decision,
                Some(BalanceWrite {
                    balance,
                    expected_version,
                }),
            )
            .await?;

        info!(
            request_id = %request.id,
            approver = %approver_id,
            days = request.days_requested,
            "leave request approved"
        );
        Ok(request)
    }

    /// Rejects a pending request. The balance is untouched.
    pub async fn reject(
        &self,
        request_id: LeaveRequestId,
        approver_id: EmployeeId,
        comment: String,
    ) -> Result<LeaveRequest, AppError> {
        let employee_id = self.request_employee(request_id).await?;
        let _guard = self.locks.acquire(&employee_id).await;
        retry_on_conflict("reject", || {
            self.try_reject(request_id, &approver_id, &comment)
        })
        .await
    }

    async fn try_reject(
        &self,
        request_id: LeaveRequestId,
        approver_id: &EmployeeId,
        comment: &str,
    ) -> Result<LeaveRequest, AppError> {
        let now = Utc::now();
        self.ensure_employee(approver_id).await?;

        let mut request = self.load_request(request_id).await?;
        request.reject(approver_id.clone(), comment.to_string(), now)?;

        let decision = Decision::new(
            request_id,
            approver_id.clone(),
            DecisionOutcome::Rejected,
            Some(comment.to_string()),
            now,
        );
        self.store
            .commit_decision(&request, LeaveStatus::Pending, &decision, None)
            .await?;

        info!(request_id = %request.id, approver = %approver_id, "leave request rejected");
        Ok(request)
    }

    /// Cancels a pending or approved request. Cancelling an approved request
    /// refunds its days; a pending one only releases its reservation.
    pub async fn cancel(
        &self,
        request_id: LeaveRequestId,
        actor_id: EmployeeId,
        comment: Option<String>,
    ) -> Result<LeaveRequest, AppError> {
        let employee_id = self.request_employee(request_id).await?;
        let _guard = self.locks.acquire(&employee_id).await;
        retry_on_conflict("cancel", || {
            self.try_cancel(request_id, &actor_id, comment.as_deref())
        })
        .await
    }

    async fn try_cancel(
        &self,
        request_id: LeaveRequestId,
        actor_id: &EmployeeId,
        comment: Option<&str>,
    ) -> Result<LeaveRequest, AppError> {
        let now = Utc::now();
        self.ensure_employee(actor_id).await?;

        let mut request = self.load_request(request_id).await?;
        let prior = request.cancel(actor_id.clone(), comment.map(str::to_string), now)?;

        let balance_write = if prior == LeaveStatus::Approved {
            let mut balance = self
                .store
                .balance(&request.employee_id, &request.leave_type_code)
                .await?
                .ok_or_else(|| {
                    AppError::InternalServerError(anyhow!(
                        "balance row missing for {} / {}",
                        request.employee_id,
                        request.leave_type_code
                    ))
                })?;
            let expected_version = balance.version;
            balance.credit(request.days_requested, now)?;
            Some(BalanceWrite {
                balance,
                expected_version,
            })
        } else {
            None
        };

        let decision = Decision::new(
            request_id,
            actor_id.clone(),
            DecisionOutcome::Cancelled,
            comment.map(str::to_string),
            now,
        );
        self.store
            .commit_decision(&request, prior, &decision, balance_write)
            .await?;

        info!(
            request_id = %request.id,
            actor = %actor_id,
            prior_status = prior.as_str(),
            "leave request cancelled"
        );
        Ok(request)
    }

    pub async fn request(&self, request_id: LeaveRequestId) -> Result<LeaveRequest, AppError> {
        self.load_request(request_id).await
    }

    /// Decision log of a request, oldest first.
    pub async fn decisions(
        &self,
        request_id: LeaveRequestId,
    ) -> Result<Vec<Decision>, AppError> {
        self.load_request(request_id).await?;
        self.store.decisions_for(request_id).await
    }

    pub async fn list(
        &self,
        filters: &RequestListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        self.store.list_requests(filters, limit, offset).await
    }

    async fn load_request(&self, request_id: LeaveRequestId) -> Result<LeaveRequest, AppError> {
        self.store
            .request(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))
    }

    async fn request_employee(
        &self,
        request_id: LeaveRequestId,
    ) -> Result<EmployeeId, AppError> {
        Ok(self.load_request(request_id).await?.employee_id)
    }

    async fn ensure_employee(&self, id: &EmployeeId) -> Result<(), AppError> {
        self.store
            .employee(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;
        Ok(())
    }
}
