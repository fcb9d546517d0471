//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// Standard account role
pub const ROLE_USER: &str = "user";

/// Read-only role
pub const ROLE_VIEWER: &str = "viewer";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted by request validation
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Minimum username length requirement
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Minimum display name length requirement
pub const MIN_NAME_LENGTH: usize = 1;

/// Maximum display name length
pub const MAX_NAME_LENGTH: usize = 100;

// =============================================================================
// Password Hashing
// =============================================================================

/// Longest secret the hasher accepts, in bytes. Longer secrets are rejected
/// instead of being truncated.
pub const MAX_SECRET_BYTES: usize = 72;

/// Lowest accepted Argon2 time cost (iterations)
pub const MIN_HASH_COST: u32 = 1;

/// Highest accepted Argon2 time cost (iterations)
pub const MAX_HASH_COST: u32 = 10;

/// Time cost used when the configured value is out of range
pub const DEFAULT_HASH_COST: u32 = 2;

// =============================================================================
// Authentication
// =============================================================================

/// Default session token lifetime in hours
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Default issuer written into session tokens
pub const DEFAULT_TOKEN_ISSUER: &str = "account-backend";

/// Minimum signing secret length (enforced by configuration loading)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// Token type identifier returned to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Pagination
// =============================================================================

/// Default page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page
pub const MAX_PAGE_SIZE: u64 = 100;
