//! Account roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_USER, ROLE_VIEWER};
use crate::error::DomainError;

/// Closed set of roles an account can hold.
///
/// Parsing is strict: labels outside the set are rejected rather than mapped
/// to a fallback role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Role {
    Admin,
    User,
    Viewer,
}

impl Role {
    /// All roles, in privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::User, Role::Viewer];

    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Stored / wire label of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
            Role::Viewer => ROLE_VIEWER,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_USER => Ok(Role::User),
            ROLE_VIEWER => Ok(Role::Viewer),
            other => Err(DomainError::invalid_role(other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
