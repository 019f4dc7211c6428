pub mod id;

pub use id::{DecisionId, EmployeeId, LeaveRequestId, LeaveTypeCode};
