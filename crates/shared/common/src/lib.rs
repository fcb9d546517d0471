//! Common utilities shared across the service crates.
//!
//! This crate provides:
//! - Unified HTTP error rendering for domain errors
//! - Configuration structures
//! - Response helpers

pub mod config;
pub mod error;
pub mod response;

pub use config::*;
pub use error::{AppError, AppResult, ErrorBody, ErrorResponse};
pub use response::{Created, CreatedId, ListResponse, MessageResponse};
