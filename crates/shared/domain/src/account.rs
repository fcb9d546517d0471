//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Account domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Apply the supplied fields. Returns true when any value actually changed,
    /// in which case `updated_at` is bumped.
    pub fn apply(&mut self, changes: AccountChanges) -> bool {
        let mut changed = false;

        if let Some(email) = changes.email {
            if email != self.email {
                self.email = email;
                changed = true;
            }
        }
        if let Some(username) = changes.username {
            if username != self.username {
                self.username = username;
                changed = true;
            }
        }
        if let Some(name) = changes.name {
            if name != self.name {
                self.name = name;
                changed = true;
            }
        }
        if let Some(role) = changes.role {
            if role != self.role {
                self.role = role;
                changed = true;
            }
        }
        if let Some(is_active) = changes.is_active {
            if is_active != self.is_active {
                self.is_active = is_active;
                changed = true;
            }
        }

        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

/// Account creation input, as received from a caller
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub username: String,
    /// Plaintext secret, hashed before storage
    pub password: String,
    pub name: String,
    /// Role label, checked against the closed role set
    pub role: String,
}

/// Validated row handed to storage on insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Partial update input; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccount {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Typed form of [`UpdateAccount`] once the role label has been parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccountResponse {
    /// Unique account identifier
    pub id: i64,
    /// Email address
    pub email: String,
    /// Login handle
    pub username: String,
    /// Display name
    pub name: String,
    /// Role label
    pub role: String,
    /// Whether the account may log in
    pub is_active: bool,
    /// Creation time, Unix seconds
    pub created_at: i64,
    /// Last modification time, Unix seconds
    pub updated_at: i64,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            username: account.username.clone(),
            name: account.name.clone(),
            role: account.role.to_string(),
            is_active: account.is_active,
            created_at: account.created_at.timestamp(),
            updated_at: account.updated_at.timestamp(),
        }
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse::from(&account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        Account {
            id: 7,
            email: "jane@example.com".to_string(),
            username: "jane".to_string(),
            password_hash: "$argon2id$digest".to_string(),
            name: "Jane".to_string(),
            role: Role::User,
            is_active: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_apply_same_values_is_noop() {
        let mut acc = account();
        let before = acc.clone();

        let changed = acc.apply(AccountChanges {
            email: Some("jane@example.com".to_string()),
            role: Some(Role::User),
            is_active: Some(true),
            ..Default::default()
        });

        assert!(!changed);
        assert_eq!(acc, before);
    }

    #[test]
    fn test_apply_only_supplied_fields() {
        let mut acc = account();

        let changed = acc.apply(AccountChanges {
            name: Some("Jane Doe".to_string()),
            is_active: Some(false),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(acc.name, "Jane Doe");
        assert!(!acc.is_active);
        assert_eq!(acc.email, "jane@example.com");
        assert_eq!(acc.role, Role::User);
        assert!(acc.updated_at > acc.created_at);
    }

    #[test]
    fn test_response_hides_digest_and_uses_unix_seconds() {
        let response = AccountResponse::from(account());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["created_at"], 1_700_000_000);
        assert_eq!(json["role"], "user");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_entity_serialization_skips_digest() {
        let json = serde_json::to_string(&account()).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
