//! Application state for dependency injection.

use std::sync::Arc;

use account_service_lib::{infra::Database, AccountService};
use auth_service_lib::AccessPolicy;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountService>,
    pub policy: AccessPolicy,
    /// Absent when the router runs without a database (tests)
    pub database: Option<Database>,
}

impl AppState {
    /// Create new app state.
    pub fn new(accounts: Arc<dyn AccountService>, policy: AccessPolicy) -> Self {
        Self {
            accounts,
            policy,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }
}
