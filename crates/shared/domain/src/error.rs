//! Domain-level errors.
//!
//! These errors represent business rule violations and access failures.
//! They are independent of infrastructure concerns (HTTP, database): each kind
//! maps to a protocol-neutral [`StatusClass`] and the boundary decides how to
//! render it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Underlying cause kept on internal faults for logging.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Reference to the account an operation was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    Id(i64),
    Email(String),
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Id(id) => write!(f, "id: {}", id),
            AccountRef::Email(email) => write!(f, "email: {}", email),
        }
    }
}

/// Closed set of failures surfaced by the service and access layers.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Unexpected or unmapped lower-layer failure
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    /// Missing, malformed, expired or invalid credentials on the request
    #[error("unauthorized: {reason}")]
    Unauthenticated { reason: String },

    /// Authenticated, but not allowed to perform the action
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Malformed request shape or semantically invalid field
    #[error("{}", describe_invalid_input(.field.as_deref(), .message))]
    InvalidInput {
        field: Option<String>,
        message: String,
    },

    /// Referenced account does not exist
    #[error("user not found with {0}")]
    NotFound(AccountRef),

    /// Email uniqueness violated
    #[error("user already exists with email: {email}")]
    AlreadyExists { email: String },

    /// Login or password verification failed, or the account is inactive
    #[error("invalid email or password")]
    InvalidCredentials,
}

fn describe_invalid_input(field: Option<&str>, message: &str) -> String {
    match field {
        Some(field) => format!("validation error on field '{}': {}", field, message),
        None => format!("validation error: {}", message),
    }
}

/// Discriminant of a [`DomainError`], for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Internal,
    Unauthenticated,
    Forbidden,
    InvalidInput,
    NotFound,
    AlreadyExists,
    InvalidCredentials,
}

/// Protocol-neutral outcome category each error kind maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    ServerFault,
    AuthenticationRequired,
    AuthorizationDenied,
    ClientInput,
    ResourceAbsent,
    Conflict,
    AuthenticationRejected,
}

impl ErrorKind {
    /// Fixed mapping from kind to status class.
    pub fn status_class(self) -> StatusClass {
        match self {
            ErrorKind::Internal => StatusClass::ServerFault,
            ErrorKind::Unauthenticated => StatusClass::AuthenticationRequired,
            ErrorKind::Forbidden => StatusClass::AuthorizationDenied,
            ErrorKind::InvalidInput => StatusClass::ClientInput,
            ErrorKind::NotFound => StatusClass::ResourceAbsent,
            ErrorKind::AlreadyExists => StatusClass::Conflict,
            ErrorKind::InvalidCredentials => StatusClass::AuthenticationRejected,
        }
    }
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Internal { .. } => ErrorKind::Internal,
            DomainError::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            DomainError::Forbidden { .. } => ErrorKind::Forbidden,
            DomainError::InvalidInput { .. } => ErrorKind::InvalidInput,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            DomainError::InvalidCredentials => ErrorKind::InvalidCredentials,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        self.kind().status_class()
    }

    /// Create an internal fault without an underlying cause
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal {
            message: msg.into(),
            cause: None,
        }
    }

    /// Create an internal fault wrapping the lower-layer error
    pub fn internal_with<E>(msg: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DomainError::Internal {
            message: msg.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        DomainError::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        DomainError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a validation error not tied to a single field
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            field: None,
            message: msg.into(),
        }
    }

    /// Create a validation error for a named field
    pub fn invalid_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            field: Some(field.into()),
            message: msg.into(),
        }
    }

    /// Role label outside the closed role set
    pub fn invalid_role(role: &str) -> Self {
        DomainError::invalid_field("role", format!("invalid role: {}", role))
    }

    pub fn not_found_id(id: i64) -> Self {
        DomainError::NotFound(AccountRef::Id(id))
    }

    pub fn not_found_email(email: impl Into<String>) -> Self {
        DomainError::NotFound(AccountRef::Email(email.into()))
    }

    pub fn already_exists(email: impl Into<String>) -> Self {
        DomainError::AlreadyExists {
            email: email.into(),
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_every_kind_has_a_distinct_status_class() {
        let kinds = [
            ErrorKind::Internal,
            ErrorKind::Unauthenticated,
            ErrorKind::Forbidden,
            ErrorKind::InvalidInput,
            ErrorKind::NotFound,
            ErrorKind::AlreadyExists,
            ErrorKind::InvalidCredentials,
        ];
        let classes: std::collections::HashSet<_> =
            kinds.iter().map(|k| k.status_class()).collect();
        assert_eq!(classes.len(), kinds.len());
    }

    #[test]
    fn test_messages_carry_context() {
        assert_eq!(
            DomainError::not_found_id(42).to_string(),
            "user not found with id: 42"
        );
        assert_eq!(
            DomainError::not_found_email("a@b.io").to_string(),
            "user not found with email: a@b.io"
        );
        assert_eq!(
            DomainError::already_exists("a@b.io").to_string(),
            "user already exists with email: a@b.io"
        );
        assert_eq!(
            DomainError::invalid_role("root").to_string(),
            "validation error on field 'role': invalid role: root"
        );
        assert_eq!(
            DomainError::validation("bad body").to_string(),
            "validation error: bad body"
        );
        assert_eq!(
            DomainError::unauthenticated("token is required").to_string(),
            "unauthorized: token is required"
        );
    }

    #[test]
    fn test_internal_keeps_cause_for_logs() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = DomainError::internal_with("failed to get user", io);

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "failed to get user");
        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
    }

    #[test]
    fn test_invalid_credentials_has_no_context() {
        assert_eq!(
            DomainError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
        assert_eq!(
            DomainError::InvalidCredentials.status_class(),
            StatusClass::AuthenticationRejected
        );
    }
}
