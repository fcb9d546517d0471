//! Account service - account lifecycle and credential checks.
//!
//! This is the only layer that turns storage, hashing and token failures into
//! [`DomainError`]s.

use std::sync::Arc;

use async_trait::async_trait;

use auth_service_lib::{IssuedToken, TokenService};
use domain::{
    Account, AccountChanges, CreateAccount, CredentialHasher, DomainError, DomainResult,
    HashError, NewAccount, Role, UpdateAccount, DEFAULT_PAGE_NUMBER,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

use crate::repository::{AccountRepository, StorageError};

/// Page request for account listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountQuery {
    pub page: u64,
    pub size: u64,
    pub only_active: bool,
}

impl AccountQuery {
    /// 1-based page; 0 is read as the first page
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Page size; 0 means the default, anything above the maximum is capped
    pub fn size(&self) -> u64 {
        match self.size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.size())
    }
}

impl Default for AccountQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
            only_active: false,
        }
    }
}

/// One page of accounts plus the total matching the filter
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    pub total_count: u64,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: IssuedToken,
    pub account: Account,
}

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and return its id
    async fn create_account(&self, input: CreateAccount) -> DomainResult<i64>;

    async fn get_account(&self, id: i64) -> DomainResult<Account>;

    async fn get_account_by_email(&self, email: &str) -> DomainResult<Account>;

    async fn list_accounts(&self, query: AccountQuery) -> DomainResult<AccountPage>;

    /// Apply the supplied fields; storage is only written when something changed
    async fn update_account(&self, id: i64, input: UpdateAccount) -> DomainResult<()>;

    async fn change_password(&self, id: i64, change: PasswordChange) -> DomainResult<()>;

    async fn delete_account(&self, id: i64) -> DomainResult<()>;

    /// Verify credentials and issue a session token
    async fn login(&self, email: &str, password: &str) -> DomainResult<Session>;
}

/// Concrete implementation of AccountService.
pub struct AccountManager {
    repo: Arc<dyn AccountRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AccountManager {
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }

    fn hash_secret(&self, field: &str, secret: &str) -> DomainResult<String> {
        self.hasher.hash(secret).map_err(|e| match e {
            HashError::SecretTooLong { max } => {
                DomainError::invalid_field(field, format!("password must not exceed {} bytes", max))
            }
            other => DomainError::internal_with("failed to hash password", other),
        })
    }
}

fn storage_fault(context: &str, err: StorageError) -> DomainError {
    DomainError::internal_with(context, err)
}

#[async_trait]
impl AccountService for AccountManager {
    async fn create_account(&self, input: CreateAccount) -> DomainResult<i64> {
        let role: Role = input.role.parse()?;

        let exists = self
            .repo
            .exists_by_email(&input.email)
            .await
            .map_err(|e| storage_fault("failed to check email existence", e))?;
        if exists {
            return Err(DomainError::already_exists(input.email));
        }

        let password_hash = self.hash_secret("password", &input.password)?;
        let email = input.email.clone();

        let id = self
            .repo
            .insert(NewAccount {
                email: input.email,
                username: input.username,
                password_hash,
                name: input.name,
                role,
                is_active: true,
            })
            .await
            .map_err(|e| match e {
                StorageError::DuplicateEmail => DomainError::already_exists(email),
                other => storage_fault("failed to create user", other),
            })?;

        tracing::info!(user_id = id, %role, "account created");
        Ok(id)
    }

    async fn get_account(&self, id: i64) -> DomainResult<Account> {
        self.repo.get_by_id(id).await.map_err(|e| match e {
            StorageError::NotFound => DomainError::not_found_id(id),
            other => storage_fault("failed to get user", other),
        })
    }

    async fn get_account_by_email(&self, email: &str) -> DomainResult<Account> {
        self.repo.get_by_email(email).await.map_err(|e| match e {
            StorageError::NotFound => DomainError::not_found_email(email),
            other => storage_fault("failed to get user", other),
        })
    }

    async fn list_accounts(&self, query: AccountQuery) -> DomainResult<AccountPage> {
        let accounts = self
            .repo
            .list(query.offset(), query.size(), query.only_active)
            .await
            .map_err(|e| storage_fault("failed to get users", e))?;

        let total_count = self
            .repo
            .count(query.only_active)
            .await
            .map_err(|e| storage_fault("failed to get user count", e))?;

        Ok(AccountPage {
            accounts,
            total_count,
        })
    }

    async fn update_account(&self, id: i64, input: UpdateAccount) -> DomainResult<()> {
        let mut account = self.get_account(id).await?;

        let role = input
            .role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()?;

        if let Some(email) = input.email.as_deref() {
            if email != account.email {
                let taken = self
                    .repo
                    .exists_by_email(email)
                    .await
                    .map_err(|e| storage_fault("failed to check email existence", e))?;
                if taken {
                    return Err(DomainError::already_exists(email));
                }
            }
        }

        let changed = account.apply(AccountChanges {
            email: input.email,
            username: input.username,
            name: input.name,
            role,
            is_active: input.is_active,
        });
        if !changed {
            tracing::debug!(user_id = id, "update carried no changes");
            return Ok(());
        }

        self.repo.update(&account).await.map_err(|e| match e {
            StorageError::DuplicateEmail => DomainError::already_exists(account.email.clone()),
            StorageError::NotFound => DomainError::not_found_id(id),
            other => storage_fault("failed to update user", other),
        })?;

        tracing::info!(user_id = id, "account updated");
        Ok(())
    }

    async fn change_password(&self, id: i64, change: PasswordChange) -> DomainResult<()> {
        if change.new_password == change.current_password {
            return Err(DomainError::invalid_field(
                "new_password",
                "new password must be different from current password",
            ));
        }

        let account = self.get_account(id).await?;

        self.hasher
            .verify(&account.password_hash, &change.current_password)
            .map_err(|_| DomainError::InvalidCredentials)?;

        let password_hash = self.hash_secret("new_password", &change.new_password)?;

        self.repo
            .update_password(id, &password_hash)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => DomainError::not_found_id(id),
                other => storage_fault("failed to update password", other),
            })?;

        tracing::info!(user_id = id, "password changed");
        Ok(())
    }

    async fn delete_account(&self, id: i64) -> DomainResult<()> {
        self.repo.delete_by_id(id).await.map_err(|e| match e {
            StorageError::NotFound => DomainError::not_found_id(id),
            other => storage_fault("failed to delete user", other),
        })?;

        tracing::info!(user_id = id, "account deleted");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> DomainResult<Session> {
        let account = match self.repo.get_by_email(email).await {
            Ok(account) => Some(account),
            Err(StorageError::NotFound) => None,
            Err(other) => return Err(storage_fault("failed to get user", other)),
        };

        // Unknown emails are checked against a decoy so every rejection costs one verification
        let digest = match &account {
            Some(account) => account.password_hash.clone(),
            None => self.hasher.decoy_digest(),
        };
        let verified = self.hasher.verify(&digest, password).is_ok();

        let account = match account {
            Some(account) if verified && account.is_active => account,
            _ => {
                tracing::debug!("login rejected");
                return Err(DomainError::InvalidCredentials);
            }
        };

        let token = self
            .tokens
            .issue(account.id, account.role)
            .map_err(|e| DomainError::internal_with("failed to issue token", e))?;

        tracing::info!(user_id = account.id, "user logged in");
        Ok(Session { token, account })
    }
}
