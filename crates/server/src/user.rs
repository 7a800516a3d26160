//! User registration endpoint.

use api_types::user::{UserNew, UserRegistered};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::Registration;

use crate::{ServerError, server::ServerState};

/// Register a user identity. Registering twice answers `200` instead of `201`
/// and leaves the balance untouched.
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<UserNew>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRegistered>), ServerError> {
    let Json(payload) = payload.map_err(|rejection| ServerError::Generic(rejection.body_text()))?;
    let (guid, registration) = state.engine.insert_user(&payload.guid).await?;

    let (status, created) = match registration {
        Registration::Created => {
            tracing::info!("registered user {guid}");
            (StatusCode::CREATED, true)
        }
        Registration::AlreadyRegistered => (StatusCode::OK, false),
    };

    Ok((status, Json(UserRegistered { guid, created })))
}
