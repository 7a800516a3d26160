//! Balance mutation and consistency engine.
//!
//! Applies signed amounts to per-user balances and guarantees a balance never
//! goes below zero. Storage is reached only through [`BalanceStore`].

pub use balances::{Registration, UserBalance};
pub use commands::BalanceCmd;
pub use error::EngineError;
pub use money::Money;
pub use mutations::{Applied, Direction, Mutation};
pub use ops::{Engine, EngineBuilder};
pub use store::{BalanceStore, MemoryStore, SqlStore, StoreError};

mod balances;
mod commands;
mod error;
mod money;
mod mutations;
mod ops;
mod store;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
