//! Balance API endpoints.

use api_types::{
    Amount,
    balance::{BalanceChange, BalanceChanged, UserBalance},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{Applied, BalanceCmd, Direction, EngineError, Money};

use crate::{ServerError, metrics::MutationOutcome, server::ServerState};

fn changed(applied: Applied) -> BalanceChanged {
    BalanceChanged {
        code: "01".to_string(),
        message: "OK".to_string(),
        applied: applied == Applied::Committed,
    }
}

async fn change_balance(
    state: &ServerState,
    payload: Result<Json<BalanceChange>, JsonRejection>,
    direction: Direction,
) -> Result<Json<BalanceChanged>, ServerError> {
    let Json(payload) = payload.map_err(|rejection| ServerError::Generic(rejection.body_text()))?;
    let amount = Money::parse_amount(payload.amount.as_str())?;
    let cmd = BalanceCmd::new(payload.user_guid, payload.operation_ref, amount);

    let result = match direction {
        Direction::Credit => state.engine.increase_balance(cmd).await,
        Direction::Debit => state.engine.reduce_balance(cmd).await,
    };
    state
        .metrics
        .record_mutation(direction, MutationOutcome::from(&result));

    if let Err(EngineError::InsufficientFunds(reason)) = &result {
        tracing::debug!("debit rejected: {reason}");
    }

    Ok(Json(changed(result?)))
}

pub async fn increase(
    State(state): State<ServerState>,
    payload: Result<Json<BalanceChange>, JsonRejection>,
) -> Result<Json<BalanceChanged>, ServerError> {
    change_balance(&state, payload, Direction::Credit).await
}

pub async fn reduce(
    State(state): State<ServerState>,
    payload: Result<Json<BalanceChange>, JsonRejection>,
) -> Result<Json<BalanceChanged>, ServerError> {
    change_balance(&state, payload, Direction::Debit).await
}

pub async fn get(
    State(state): State<ServerState>,
    Path(guid): Path<String>,
) -> Result<Json<UserBalance>, ServerError> {
    let balance = state.engine.user_balance(&guid).await?;

    Ok(Json(UserBalance {
        guid: balance.user_id,
        amount: Amount::new(balance.balance.to_string()),
    }))
}
