//! HTTP handlers.

pub mod auth_handler;
pub mod health_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use health_handler::{health_routes, welcome};
pub use user_handler::{get_current_user, user_routes};

use auth_service_lib::policy::MSG_INVALID_USER_ID;
use common::{AppError, AppResult};
use domain::DomainError;

/// Parse a `:id` path segment.
pub(crate) fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::from(DomainError::invalid_field("id", MSG_INVALID_USER_ID)))
}
