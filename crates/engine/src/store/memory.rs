//! In-process `BalanceStore`.
//!
//! A single `Mutex` guards balances and the applied-mutation index together,
//! so the floor check and the write happen under the same lock.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BalanceStore, StoreError, next_balance};
use crate::{Applied, Money, Mutation, Registration};

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<Uuid, Money>,
    applied: HashMap<(Uuid, String), Money>,
}

/// Thread-safe in-memory store. Cloning shares the underlying ledger.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    ledger: Arc<Mutex<Ledger>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn get_balance(&self, user_id: Uuid) -> Result<Option<Money>, StoreError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.balances.get(&user_id).copied())
    }

    async fn apply_signed_mutation(&self, mutation: &Mutation) -> Result<Applied, StoreError> {
        let mut ledger = self.ledger.lock().await;
        let key = (mutation.user_id, mutation.operation_ref.clone());

        if let Some(previous) = ledger.applied.get(&key) {
            if *previous == mutation.amount {
                return Ok(Applied::Replayed);
            }
            return Err(StoreError::OperationConflict(*previous));
        }

        let current = ledger
            .balances
            .get(&mutation.user_id)
            .copied()
            .unwrap_or(Money::ZERO);
        let next = next_balance(current, mutation.amount)?;

        ledger.balances.insert(mutation.user_id, next);
        ledger.applied.insert(key, mutation.amount);
        Ok(Applied::Committed)
    }

    async fn register_user(&self, user_id: Uuid) -> Result<Registration, StoreError> {
        let mut ledger = self.ledger.lock().await;
        if ledger.balances.contains_key(&user_id) {
            return Ok(Registration::AlreadyRegistered);
        }
        ledger.balances.insert(user_id, Money::ZERO);
        Ok(Registration::Created)
    }
}
