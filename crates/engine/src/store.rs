//! Persistence collaborator consumed by the engine.
//!
//! A `BalanceStore` owns durable balances and must apply a mutation as one
//! indivisible read-check-write: two concurrent debits against the same user
//! can never both observe a sufficient balance and both commit.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::{Applied, Money, Mutation, Registration};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

/// Storage outcomes the engine translates into `EngineError`s.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The floor check rejected a debit; nothing was written.
    #[error("balance would become negative")]
    InsufficientFunds,
    /// The ceiling check rejected a credit; nothing was written.
    #[error("balance would overflow")]
    BalanceOverflow,
    /// The operation reference was already applied with another amount.
    #[error("operation reference already applied with amount {0}")]
    OperationConflict(Money),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[async_trait]
pub trait BalanceStore: Send + Sync + std::fmt::Debug {
    /// Returns `None` when no balance record exists for `user_id`.
    async fn get_balance(&self, user_id: Uuid) -> Result<Option<Money>, StoreError>;

    /// Atomically adds `mutation.amount` to the balance, creating the record
    /// when missing.
    async fn apply_signed_mutation(&self, mutation: &Mutation) -> Result<Applied, StoreError>;

    /// Creates a zero balance record; an existing record is left untouched.
    async fn register_user(&self, user_id: Uuid) -> Result<Registration, StoreError>;
}

/// Floor and ceiling rule for stores that compute the next balance in process.
pub(crate) fn next_balance(current: Money, delta: Money) -> Result<Money, StoreError> {
    match current.checked_add(delta) {
        Some(next) if next.is_negative() => Err(StoreError::InsufficientFunds),
        Some(next) => Ok(next),
        None if delta.is_negative() => Err(StoreError::InsufficientFunds),
        None => Err(StoreError::BalanceOverflow),
    }
}
