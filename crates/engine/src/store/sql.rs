//! `BalanceStore` backed by sea-orm (SQLite or PostgreSQL).
//!
//! The floor check is a conditional `UPDATE` (`balance_minor >= |delta|`), so
//! the check and the write are a single statement. Every mutation runs in one
//! transaction together with the row upsert and the ledger insert; on SQLite
//! the first statement is a write, which serializes concurrent writers.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, DatabaseTransaction, QueryFilter, QueryTrait,
    SqlErr, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use super::{BalanceStore, StoreError};
use crate::{Applied, Money, Mutation, Registration, balances, mutations};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

#[derive(Clone, Debug)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    /// The schema from the `migration` crate must already be applied.
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Inserts a zero balance row unless one exists. Returns rows inserted.
    async fn ensure_balance_row<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
        let model = balances::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            balance_minor: ActiveValue::Set(0),
            created_at: ActiveValue::Set(Utc::now()),
        };
        let stmt = balances::Entity::insert(model)
            .on_conflict(
                OnConflict::column(balances::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .build(db.get_database_backend());

        Ok(db.execute(stmt).await?.rows_affected())
    }

    async fn find_applied<C: ConnectionTrait>(
        db: &C,
        mutation: &Mutation,
    ) -> Result<Option<mutations::Model>, DbErr> {
        mutations::Entity::find()
            .filter(mutations::Column::UserId.eq(mutation.user_id.to_string()))
            .filter(mutations::Column::OperationRef.eq(mutation.operation_ref.clone()))
            .one(db)
            .await
    }

    async fn apply_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        mutation: &Mutation,
    ) -> Result<Applied, StoreError> {
        Self::ensure_balance_row(db_tx, mutation.user_id).await?;

        if let Some(existing) = Self::find_applied(db_tx, mutation).await? {
            return replay_outcome(&existing, mutation);
        }

        let delta = mutation.amount.minor();
        let (guard, rejection) = if delta < 0 {
            let required = delta.checked_neg().ok_or(StoreError::InsufficientFunds)?;
            (
                balances::Column::BalanceMinor.gte(required),
                StoreError::InsufficientFunds,
            )
        } else {
            (
                balances::Column::BalanceMinor.lte(i64::MAX - delta),
                StoreError::BalanceOverflow,
            )
        };

        let updated = balances::Entity::update_many()
            .col_expr(
                balances::Column::BalanceMinor,
                Expr::col(balances::Column::BalanceMinor).add(delta),
            )
            .filter(balances::Column::UserId.eq(mutation.user_id.to_string()))
            .filter(guard)
            .exec(db_tx)
            .await?;
        if updated.rows_affected == 0 {
            return Err(rejection);
        }

        mutations::ActiveModel::from(mutation).insert(db_tx).await?;

        Ok(Applied::Committed)
    }
}

fn replay_outcome(existing: &mutations::Model, mutation: &Mutation) -> Result<Applied, StoreError> {
    if existing.amount_minor == mutation.amount.minor() {
        Ok(Applied::Replayed)
    } else {
        Err(StoreError::OperationConflict(Money::from_minor(
            existing.amount_minor,
        )))
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl BalanceStore for SqlStore {
    async fn get_balance(&self, user_id: Uuid) -> Result<Option<Money>, StoreError> {
        let model = balances::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(|model| Money::from_minor(model.balance_minor)))
    }

    async fn apply_signed_mutation(&self, mutation: &Mutation) -> Result<Applied, StoreError> {
        let outcome = with_tx!(self, |db_tx| self.apply_in_tx(&db_tx, mutation).await);

        match outcome {
            // A concurrent request with the same reference committed first.
            Err(StoreError::Database(err)) if is_unique_violation(&err) => {
                match Self::find_applied(&self.database, mutation).await? {
                    Some(existing) => replay_outcome(&existing, mutation),
                    None => Err(StoreError::Database(err)),
                }
            }
            other => other,
        }
    }

    async fn register_user(&self, user_id: Uuid) -> Result<Registration, StoreError> {
        let inserted = Self::ensure_balance_row(&self.database, user_id).await?;
        if inserted == 0 {
            Ok(Registration::AlreadyRegistered)
        } else {
            Ok(Registration::Created)
        }
    }
}
