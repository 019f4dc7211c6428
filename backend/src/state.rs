use std::sync::Arc;

use crate::config::Config;
use crate::repositories::LeaveStore;
use crate::services::{DirectoryService, EmployeeLocks, LeaveService};

#[derive(Clone)]
pub struct AppState {
    pub leave: Arc<LeaveService>,
    pub directory: Arc<DirectoryService>,
    pub config: Config,
}

impl AppState {
    /// Wires both services over one store and one shared lock registry, so
    /// grants and lifecycle writes for an employee serialize with each other.
    pub fn new(store: Arc<dyn LeaveStore>, config: Config) -> Self {
        let locks = Arc::new(EmployeeLocks::new());
        Self {
            leave: Arc::new(LeaveService::new(store.clone(), locks.clone())),
            directory: Arc::new(DirectoryService::new(store, locks)),
            config,
        }
    }
}
