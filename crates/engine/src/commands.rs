//! Command structs for engine operations.
//!
//! Balance mutations take the same three inputs in both directions; grouping
//! them keeps call sites readable and avoids mixing up the two strings.

use crate::Money;

/// Credit or debit a user balance.
///
/// `user_id` and `operation_ref` are raw caller input; the engine validates
/// them. `amount` is unsigned by contract: the operation decides the sign.
#[derive(Clone, Debug)]
pub struct BalanceCmd {
    pub user_id: String,
    pub operation_ref: String,
    pub amount: Money,
}

impl BalanceCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        operation_ref: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            operation_ref: operation_ref.into(),
            amount,
        }
    }
}
