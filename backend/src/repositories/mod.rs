pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryLeaveStore;
pub use postgres::PgLeaveStore;
pub use store::{BalanceWrite, LeaveStore, RequestListFilters};

#[cfg(test)]
pub use store::MockLeaveStore;
