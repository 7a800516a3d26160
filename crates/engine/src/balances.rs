//! The module contains `UserBalance` and the `user_balances` table.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::Money;

/// Current balance of a user identity.
///
/// A user that was never registered nor mutated reads as a zero balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserBalance {
    pub user_id: Uuid,
    pub balance: Money,
}

impl UserBalance {
    pub fn zero(user_id: Uuid) -> Self {
        Self {
            user_id,
            balance: Money::ZERO,
        }
    }
}

/// Outcome of a user registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyRegistered,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mutations::Entity")]
    Mutations,
}

impl Related<super::mutations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mutations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
