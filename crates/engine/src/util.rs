//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every engine operation rejects malformed input the same way.

use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Parse a UUID and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| EngineError::InvalidId(format!("invalid {label} id: {value}")))
}

/// Operation references are opaque, but must carry something to deduplicate on.
pub(crate) fn normalize_operation_ref(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidOperationRef(
            "operation reference must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Amounts are supplied unsigned; the direction decides the sign.
pub(crate) fn ensure_non_negative(amount: Money) -> ResultEngine<Money> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be >= 0, got {amount}"
        )));
    }
    Ok(amount)
}
