//! Business logic over the [`LeaveStore`](crate::repositories::LeaveStore)
//! trait: request lifecycle, directory and reference data, balance grants.

pub mod directory;
pub mod leave_service;
pub mod locks;

pub use directory::DirectoryService;
pub use leave_service::{LeaveService, NewLeaveRequest};
pub use locks::EmployeeLocks;

use std::future::Future;

use tracing::warn;

use crate::error::AppError;

/// Upper bound on transparent retries after a lost write race.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

const RETRY_EXHAUSTED_MESSAGE: &str =
    "The operation could not be completed due to concurrent updates. Please try again.";

/// Runs `op` until it returns anything other than [`AppError::Conflict`],
/// giving up after [`MAX_COMMIT_ATTEMPTS`] tries. Callers that need
/// serialization acquire their employee lock before calling this.
pub(crate) async fn retry_on_conflict<T, F, Fut>(operation: &str, op: F) -> Result<T, AppError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match op().await {
            Err(AppError::Conflict(reason)) => {
                if attempts < MAX_COMMIT_ATTEMPTS {
                    warn!(operation, attempt = attempts, %reason, "write conflict, retrying");
                    continue;
                }
                warn!(operation, attempts, "write conflict persisted, giving up");
                return Err(AppError::Conflict(RETRY_EXHAUSTED_MESSAGE.to_string()));
            }
            result => return result,
        }
    }
}
