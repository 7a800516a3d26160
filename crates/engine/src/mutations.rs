//! Balance mutation primitives.
//!
//! A `Mutation` is a signed adjustment of one user balance, tagged with the
//! reference of the external event that caused it. Applied mutations are
//! recorded in `balance_mutations`, unique per `(user_id, operation_ref)`.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::Money;

/// Direction of a mutation as requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    /// Turns a non-negative amount into the signed amount submitted to storage.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }
}

/// A signed adjustment ready to be applied by a `BalanceStore`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    pub user_id: Uuid,
    pub operation_ref: String,
    /// Positive for credits, negative for debits.
    pub amount: Money,
}

/// Outcome of applying a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The mutation changed the balance.
    Committed,
    /// The same mutation was already applied; the balance is unchanged.
    Replayed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "balance_mutations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub operation_ref: String,
    pub amount_minor: i64,
    pub applied_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::balances::Entity",
        from = "Column::UserId",
        to = "super::balances::Column::UserId"
    )]
    Balances,
}

impl Related<super::balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Mutation> for ActiveModel {
    fn from(mutation: &Mutation) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(mutation.user_id.to_string()),
            operation_ref: ActiveValue::Set(mutation.operation_ref.clone()),
            amount_minor: ActiveValue::Set(mutation.amount.minor()),
            applied_at: ActiveValue::Set(Utc::now()),
        }
    }
}
