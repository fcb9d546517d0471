//! Unified error handling for HTTP.
//!
//! Domain errors are translated to a status and a `{ "error": { code, message } }`
//! body exactly once, here. Anything that is not a client-facing domain error
//! renders as a generic 500 and its detail only goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, ErrorKind, StatusClass};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned to clients for every server fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Error response body for HTTP
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    /// Stable machine-readable error code
    pub code: String,
    /// Human-readable description
    pub message: String,
}

/// HTTP status for a domain status class.
pub fn status_for(class: StatusClass) -> StatusCode {
    match class {
        StatusClass::ServerFault => StatusCode::INTERNAL_SERVER_ERROR,
        StatusClass::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        StatusClass::AuthorizationDenied => StatusCode::FORBIDDEN,
        StatusClass::ClientInput => StatusCode::BAD_REQUEST,
        StatusClass::ResourceAbsent => StatusCode::NOT_FOUND,
        StatusClass::Conflict => StatusCode::CONFLICT,
        StatusClass::AuthenticationRejected => StatusCode::UNAUTHORIZED,
    }
}

/// Client-facing code for a domain error kind.
pub fn code_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Internal => "INTERNAL_ERROR",
        ErrorKind::Unauthenticated => "UNAUTHORIZED",
        ErrorKind::Forbidden => "FORBIDDEN",
        ErrorKind::InvalidInput => "VALIDATION_ERROR",
        ErrorKind::NotFound => "NOT_FOUND",
        ErrorKind::AlreadyExists => "CONFLICT",
        ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
    }
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(e) => code_for(e.kind()),
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(e) => status_for(e.status_class()),
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Internal { message, cause }) => {
                match cause {
                    Some(cause) => tracing::error!(error = %cause, "Internal error: {}", message),
                    None => tracing::error!("Internal error: {}", message),
                }
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::Domain(e) => e.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Domain(DomainError::validation(msg))
    }
}
