//! Account repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, SqlErr,
};
use thiserror::Error;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use domain::{Account, NewAccount};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Storage failures, kept narrow so the service can map them exhaustively.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("account not found")]
    NotFound,

    #[error("email already in use")]
    DuplicateEmail,

    #[error("storage backend error: {0}")]
    Backend(#[source] DbErr),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StorageError::DuplicateEmail,
            _ => StorageError::Backend(err),
        }
    }
}

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account and return its id
    async fn insert(&self, account: NewAccount) -> Result<i64, StorageError>;

    async fn get_by_id(&self, id: i64) -> Result<Account, StorageError>;

    async fn get_by_email(&self, email: &str) -> Result<Account, StorageError>;

    /// Newest first
    async fn list(
        &self,
        offset: u64,
        limit: u64,
        only_active: bool,
    ) -> Result<Vec<Account>, StorageError>;

    async fn count(&self, only_active: bool) -> Result<u64, StorageError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, StorageError>;

    /// Persist profile fields (everything except the password digest)
    async fn update(&self, account: &Account) -> Result<(), StorageError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StorageError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError>;
}

/// Concrete implementation of AccountRepository on PostgreSQL
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped(only_active: bool) -> Select<AccountEntity> {
        let query = AccountEntity::find();
        if only_active {
            query.filter(account::Column::IsActive.eq(true))
        } else {
            query
        }
    }
}

fn into_account(model: account::Model) -> Result<Account, StorageError> {
    Account::try_from(model).map_err(StorageError::Backend)
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn insert(&self, account: NewAccount) -> Result<i64, StorageError> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            email: Set(account.email),
            username: Set(account.username),
            password_hash: Set(account.password_hash),
            name: Set(account.name),
            role: Set(account.role.to_string()),
            is_active: Set(account.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(model.id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Account, StorageError> {
        let model = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StorageError::NotFound)?;

        into_account(model)
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, StorageError> {
        let model = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(StorageError::NotFound)?;

        into_account(model)
    }

    async fn list(
        &self,
        offset: u64,
        limit: u64,
        only_active: bool,
    ) -> Result<Vec<Account>, StorageError> {
        let models = Self::scoped(only_active)
            .order_by_desc(account::Column::CreatedAt)
            .order_by_desc(account::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        models.into_iter().map(into_account).collect()
    }

    async fn count(&self, only_active: bool) -> Result<u64, StorageError> {
        Ok(Self::scoped(only_active).count(&self.db).await?)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StorageError> {
        let count = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn update(&self, account: &Account) -> Result<(), StorageError> {
        let active = ActiveModel {
            id: Unchanged(account.id),
            email: Set(account.email.clone()),
            username: Set(account.username.clone()),
            password_hash: NotSet,
            name: Set(account.name.clone()),
            role: Set(account.role.to_string()),
            is_active: Set(account.is_active),
            created_at: NotSet,
            updated_at: Set(Utc::now()),
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), StorageError> {
        let result = AccountEntity::update_many()
            .col_expr(account::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let result = AccountEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Role;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn row(id: i64, role: &str) -> account::Model {
        let now = Utc::now();
        account::Model {
            id,
            email: format!("user{}@example.com", id),
            username: format!("user{}", id),
            password_hash: "$argon2id$digest".to_string(),
            name: format!("User {}", id),
            role: role.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()])
            .into_connection();
        let store = AccountStore::new(db);

        assert!(matches!(
            store.get_by_id(9).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_by_email_converts_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(4, "admin")]])
            .into_connection();
        let store = AccountStore::new(db);

        let account = store.get_by_email("user4@example.com").await.unwrap();
        assert_eq!(account.id, 4);
        assert_eq!(account.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_row_with_unknown_role_is_backend_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(4, "root")]])
            .into_connection();
        let store = AccountStore::new(db);

        assert!(matches!(
            store.get_by_id(4).await,
            Err(StorageError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_list_returns_rows_in_query_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(3, "user"), row(2, "viewer")]])
            .into_connection();
        let store = AccountStore::new(db);

        let accounts = store.list(0, 20, true).await.unwrap();
        let ids: Vec<i64> = accounts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_zero_rows_affected_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(0)])
            .into_connection();
        let store = AccountStore::new(db);

        assert!(matches!(
            store.update_password(5, "$argon2id$new").await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            store.delete_by_id(5).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let store = AccountStore::new(db);

        assert!(store.delete_by_id(5).await.is_ok());
    }

    #[test]
    fn test_generic_db_error_is_backend() {
        let err = StorageError::from(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
