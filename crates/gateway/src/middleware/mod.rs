//! Middleware for authentication and access gates.

mod auth;

pub use auth::{admin_middleware, auth_middleware, self_or_admin_middleware};
