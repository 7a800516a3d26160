use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{BalanceStore, EngineError, MemoryStore, ResultEngine, SqlStore};

mod balances;
mod users;

/// The balance engine.
///
/// Stateless apart from the shared store handle: it is safe to call from many
/// tasks at once, and all concurrency control lives in the `BalanceStore`.
#[derive(Clone, Debug)]
pub struct Engine {
    store: Arc<dyn BalanceStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn BalanceStore>>,
}

impl EngineBuilder {
    /// Use a migrated database through `SqlStore`.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.store = Some(Arc::new(SqlStore::new(db)));
        self
    }

    /// Use any `BalanceStore` implementation.
    pub fn store(mut self, store: impl BalanceStore + 'static) -> EngineBuilder {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use a process-local `MemoryStore`.
    pub fn in_memory(self) -> EngineBuilder {
        self.store(MemoryStore::new())
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self.store.ok_or_else(|| {
            EngineError::Misconfigured("no balance store configured".to_string())
        })?;
        Ok(Engine { store })
    }
}
