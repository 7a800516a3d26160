use crate::{
    Applied, BalanceCmd, Direction, EngineError, Mutation, ResultEngine, StoreError, UserBalance,
    util::{ensure_non_negative, normalize_operation_ref, parse_uuid},
};

use super::Engine;

/// Generates a balance mutation method (increase, reduce).
macro_rules! impl_balance_mutation {
    ($(#[$meta:meta])* $fn_name:ident, $direction:expr) => {
        $(#[$meta])*
        pub async fn $fn_name(&self, cmd: BalanceCmd) -> ResultEngine<Applied> {
            self.apply_mutation(cmd, $direction).await
        }
    };
}

impl Engine {
    impl_balance_mutation!(
        /// Credit `cmd.amount` to the user balance.
        ///
        /// Replaying the same operation reference with the same amount is a
        /// no-op reported as `Applied::Replayed`.
        increase_balance,
        Direction::Credit
    );

    impl_balance_mutation!(
        /// Debit `cmd.amount` from the user balance.
        ///
        /// Fails with `EngineError::InsufficientFunds` when the balance is
        /// lower than the amount; the balance is left unchanged.
        reduce_balance,
        Direction::Debit
    );

    /// Current balance of `user_id`; unknown users read as zero.
    pub async fn user_balance(&self, user_id: &str) -> ResultEngine<UserBalance> {
        let user_id = parse_uuid(user_id, "user")?;
        let balance = self
            .store
            .get_balance(user_id)
            .await
            .map_err(|err| store_error(err, user_id))?;

        Ok(match balance {
            Some(balance) => UserBalance { user_id, balance },
            None => UserBalance::zero(user_id),
        })
    }

    async fn apply_mutation(&self, cmd: BalanceCmd, direction: Direction) -> ResultEngine<Applied> {
        let user_id = parse_uuid(&cmd.user_id, "user")?;
        let operation_ref = normalize_operation_ref(&cmd.operation_ref)?;
        let amount = ensure_non_negative(cmd.amount)?;

        let mutation = Mutation {
            user_id,
            operation_ref,
            amount: direction.signed(amount),
        };

        self.store
            .apply_signed_mutation(&mutation)
            .await
            .map_err(|err| store_error(err, user_id))
    }
}

/// Translate storage outcomes into engine errors.
pub(super) fn store_error(err: StoreError, user_id: uuid::Uuid) -> EngineError {
    match err {
        StoreError::InsufficientFunds => {
            EngineError::InsufficientFunds(format!("not enough money for user {user_id}"))
        }
        StoreError::BalanceOverflow => {
            EngineError::MaxBalanceReached(format!("balance of user {user_id} would overflow"))
        }
        StoreError::OperationConflict(previous) => EngineError::ExistingKey(format!(
            "operation reference already applied to user {user_id} with amount {previous}"
        )),
        StoreError::Database(err) => EngineError::Database(err),
    }
}
