//! Account Service Library
//!
//! Account lifecycle, credential verification and session issuance on top of
//! PostgreSQL. The HTTP gateway embeds this crate directly.

pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use auth_service_lib::TokenService;
use domain::CredentialHasher;

use crate::infra::Database;
use crate::repository::AccountStore;
use crate::service::AccountManager;

pub use service::{AccountPage, AccountQuery, AccountService, PasswordChange, Session};

/// Wire the PostgreSQL store, hasher and token service into an account service.
pub fn build_service(
    db: DatabaseConnection,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
) -> Arc<dyn AccountService> {
    let repo = Arc::new(AccountStore::new(db));
    Arc::new(AccountManager::new(repo, hasher, tokens))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    database_url: &str,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(database_url).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for state in db.migration_status().await? {
                let marker = if state.applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, state.name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
