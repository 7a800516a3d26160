//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InsufficientFunds`] thrown when a debit would drive a balance below zero.
//! - [`MaxBalanceReached`] thrown when a credit would overflow a balance.
//! - [`ExistingKey`] thrown when an operation reference is reused for a
//!   different amount.
//! - [`InvalidId`], [`InvalidAmount`], [`InvalidOperationRef`] for malformed
//!   input.
//! - [`Misconfigured`] thrown by `EngineBuilder::build` when the engine was not
//!   wired to a store.
//!
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`MaxBalanceReached`]: EngineError::MaxBalanceReached
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidOperationRef`]: EngineError::InvalidOperationRef
//!  [`Misconfigured`]: EngineError::Misconfigured
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid operation reference: {0}")]
    InvalidOperationRef(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Max balance reached: {0}")]
    MaxBalanceReached(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Engine misconfigured: {0}")]
    Misconfigured(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by malformed caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidId(_) | Self::InvalidAmount(_) | Self::InvalidOperationRef(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidOperationRef(a), Self::InvalidOperationRef(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::MaxBalanceReached(a), Self::MaxBalanceReached(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Misconfigured(a), Self::Misconfigured(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
