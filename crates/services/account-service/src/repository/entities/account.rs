//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Account, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database row to domain entity. A role label outside the closed
/// set means the row is corrupt, not that the account has a default role.
impl TryFrom<Model> for Account {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role = model.role.parse::<Role>().map_err(|_| {
            DbErr::Type(format!(
                "users row {} has unknown role '{}'",
                model.id, model.role
            ))
        })?;

        Ok(Account {
            id: model.id,
            email: model.email,
            username: model.username,
            password_hash: model.password_hash,
            name: model.name,
            role,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
