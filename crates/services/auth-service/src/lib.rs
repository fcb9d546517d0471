//! Auth Service Library
//!
//! Session token issuance and verification, and the access gates that turn a
//! request's `Authorization` header into a verified [`Identity`].

pub mod policy;
pub mod token;

pub use policy::{require_admin, require_role, require_self_or_admin, AccessPolicy};
pub use token::{Claims, Identity, IssuedToken, JwtTokenService, TokenConfig, TokenError, TokenService};

#[cfg(any(test, feature = "test-utils"))]
pub use token::MockTokenService;
