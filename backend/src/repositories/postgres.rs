//! PostgreSQL [`LeaveStore`] backend.
//!
//! Write guards are expressed in SQL: status flips carry
//! `AND status = $expected`, balance writes carry `AND version = $expected`,
//! and zero affected rows comes back as [`AppError::Conflict`]. Grouped
//! writes run inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::decision::Decision;
use crate::models::employee::Employee;
use crate::models::leave_balance::LeaveBalance;
use crate::models::leave_request::{LeaveRequest, LeaveStatus};
use crate::models::leave_type::LeaveType;
use crate::types::{EmployeeId, LeaveRequestId, LeaveTypeCode};

use super::store::{BalanceWrite, LeaveStore, RequestListFilters};

const REQUEST_COLUMNS: &str = "r.id, r.employee_id, r.leave_type_code, r.start_date, r.end_date, \
     r.days_requested, r.reason, r.status, r.submitted_at, r.decided_by, r.decided_at, \
     r.decision_comment, r.updated_at";

pub struct PgLeaveStore {
    pool: PgPool,
}

impl PgLeaveStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends WHERE or AND depending on whether a clause has already been added.
fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

fn apply_request_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    filters: &'a RequestListFilters,
) {
    let mut has_clause = false;
    if let Some(ref employee_id) = filters.employee_id {
        push_clause(builder, &mut has_clause);
        builder.push("r.employee_id = ").push_bind(employee_id);
    }
    if let Some(ref manager_id) = filters.manager_id {
        push_clause(builder, &mut has_clause);
        builder.push("e.manager_id = ").push_bind(manager_id);
    }
    if let Some(status) = filters.status {
        push_clause(builder, &mut has_clause);
        builder.push("r.status = ").push_bind(status);
    }
    if let Some(from) = filters.submitted_from.as_ref() {
        push_clause(builder, &mut has_clause);
        builder.push("r.submitted_at >= ").push_bind(*from);
    }
    if let Some(to) = filters.submitted_to.as_ref() {
        push_clause(builder, &mut has_clause);
        builder.push("r.submitted_at <= ").push_bind(*to);
    }
    if let Some(ref search) = filters.search {
        push_clause(builder, &mut has_clause);
        builder
            .push("r.reason ILIKE ")
            .push_bind(format!("%{}%", search));
    }
}

#[async_trait]
impl LeaveStore for PgLeaveStore {
    async fn create_employee(
        &self,
        display_name: String,
        manager_id: Option<EmployeeId>,
        now: DateTime<Utc>,
    ) -> Result<Employee, AppError> {
        // Concurrent registrations can race to the same sequence number; the
        // primary key catches that and the caller retries.
        let last_seq: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(CAST(SUBSTRING(id FROM 2) AS BIGINT)), 1000) \
             FROM employees WHERE id ~ '^E[0-9]+$'",
        )
        .fetch_one(&self.pool)
        .await?;

        let employee = Employee {
            id: EmployeeId::from(format!("E{:04}", last_seq + 1)),
            display_name,
            manager_id,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO employees (id, display_name, manager_id, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&employee.id)
        .bind(&employee.display_name)
        .bind(&employee.manager_id)
        .bind(employee.created_at)
        .execute(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, display_name, manager_id, created_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn insert_leave_type(&self, leave_type: &LeaveType) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO leave_types (code, description, max_days_per_request, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&leave_type.code)
        .bind(&leave_type.description)
        .bind(leave_type.max_days_per_request)
        .bind(leave_type.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn leave_type(&self, code: &LeaveTypeCode) -> Result<Option<LeaveType>, AppError> {
        let leave_type = sqlx::query_as::<_, LeaveType>(
            "SELECT code, description, max_days_per_request, created_at \
             FROM leave_types WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(leave_type)
    }

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, AppError> {
        let types = sqlx::query_as::<_, LeaveType>(
            "SELECT code, description, max_days_per_request, created_at \
             FROM leave_types ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    async fn balance(
        &self,
        employee_id: &EmployeeId,
        code: &LeaveTypeCode,
    ) -> Result<Option<LeaveBalance>, AppError> {
        let balance = sqlx::query_as::<_, LeaveBalance>(
            "SELECT employee_id, leave_type_code, accrued_days, used_days, version, updated_at \
             FROM leave_balances WHERE employee_id = $1 AND leave_type_code = $2",
        )
        .bind(employee_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(balance)
    }

    async fn balances_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<LeaveBalance>, AppError> {
        let balances = sqlx::query_as::<_, LeaveBalance>(
            "SELECT employee_id, leave_type_code, accrued_days, used_days, version, updated_at \
             FROM leave_balances WHERE employee_id = $1 ORDER BY leave_type_code",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(balances)
    }

    async fn put_balance(
        &self,
        balance: &LeaveBalance,
        expected_version: Option<i64>,
    ) -> Result<(), AppError> {
        match expected_version {
            None => {
                sqlx::query(
                    "INSERT INTO leave_balances \
                     (employee_id, leave_type_code, accrued_days, used_days, version, updated_at) \
                     VALUES ($1, $2, $3, $4, 0, $5)",
                )
                .bind(&balance.employee_id)
                .bind(&balance.leave_type_code)
                .bind(balance.accrued_days)
                .bind(balance.used_days)
                .bind(balance.updated_at)
                .execute(&self.pool)
                .await?;
            }
            Some(expected) => {
                let result = sqlx::query(
                    "UPDATE leave_balances \
                     SET accrued_days = $1, used_days = $2, version = version + 1, updated_at = $3 \
                     WHERE employee_id = $4 AND leave_type_code = $5 AND version = $6",
                )
                .bind(balance.accrued_days)
                .bind(balance.used_days)
                .bind(balance.updated_at)
                .bind(&balance.employee_id)
                .bind(&balance.leave_type_code)
                .bind(expected)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(AppError::Conflict(
                        "Balance row was modified concurrently".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn insert_request(&self, request: &LeaveRequest) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO leave_requests \
             (id, employee_id, leave_type_code, start_date, end_date, days_requested, reason, \
              status, submitted_at, decided_by, decided_at, decision_comment, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(request.id)
        .bind(&request.employee_id)
        .bind(&request.leave_type_code)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.days_requested)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.submitted_at)
        .bind(&request.decided_by)
        .bind(request.decided_at)
        .bind(&request.decision_comment)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn request(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, AppError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests r WHERE r.id = $1");
        let request = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn active_requests(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests r \
             WHERE r.employee_id = $1 AND r.status IN ('pending', 'approved') \
             ORDER BY r.submitted_at"
        );
        let requests = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    async fn list_requests(
        &self,
        filters: &RequestListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {REQUEST_COLUMNS} FROM leave_requests r"));
        if filters.manager_id.is_some() {
            builder.push(" JOIN employees e ON e.id = r.employee_id");
        }
        apply_request_filters(&mut builder, filters);
        builder
            .push(" ORDER BY r.submitted_at DESC, r.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let requests = builder
            .build_query_as::<LeaveRequest>()
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    async fn commit_decision(
        &self,
        updated: &LeaveRequest,
        expected_status: LeaveStatus,
        decision: &Decision,
        balance_write: Option<BalanceWrite>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE leave_requests \
             SET status = $1, decided_by = $2, decided_at = $3, decision_comment = $4, \
                 updated_at = $5 \
             WHERE id = $6 AND status = $7",
        )
        .bind(updated.status)
        .bind(&updated.decided_by)
        .bind(updated.decided_at)
        .bind(&updated.decision_comment)
        .bind(updated.updated_at)
        .bind(updated.id)
        .bind(expected_status)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "Leave request was modified concurrently".to_string(),
            ));
        }

        if let Some(write) = balance_write {
            let result = sqlx::query(
                "UPDATE leave_balances \
                 SET accrued_days = $1, used_days = $2, version = version + 1, updated_at = $3 \
                 WHERE employee_id = $4 AND leave_type_code = $5 AND version = $6",
            )
            .bind(write.balance.accrued_days)
            .bind(write.balance.used_days)
            .bind(write.balance.updated_at)
            .bind(&write.balance.employee_id)
            .bind(&write.balance.leave_type_code)
            .bind(write.expected_version)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(AppError::Conflict(
                    "Balance row was modified concurrently".to_string(),
                ));
            }
        }

        sqlx::query(
            "INSERT INTO decisions (id, request_id, decided_by, outcome, comment, decided_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(decision.id)
        .bind(decision.request_id)
        .bind(&decision.decided_by)
        .bind(decision.outcome)
        .bind(&decision.comment)
        .bind(decision.decided_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn decisions_for(&self, request_id: LeaveRequestId) -> Result<Vec<Decision>, AppError> {
        let decisions = sqlx::query_as::<_, Decision>(
            "SELECT id, request_id, decided_by, outcome, comment, decided_at \
             FROM decisions WHERE request_id = $1 ORDER BY decided_at",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(decisions)
    }
}
