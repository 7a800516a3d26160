use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ErrorResponse;
pub use server::{ServerOptions, app, run_with_listener};

mod balance;
mod health;
mod metrics;
mod server;
mod user;

pub enum ServerError {
    Engine(EngineError),
    Timeout,
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidId(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidOperationRef(_) => StatusCode::BAD_REQUEST,
        EngineError::InsufficientFunds(_) => StatusCode::FORBIDDEN,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::MaxBalanceReached(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Misconfigured(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn code_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::InvalidId(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidOperationRef(_) => "02",
        EngineError::InsufficientFunds(_) => "03",
        EngineError::ExistingKey(_) => "04",
        EngineError::MaxBalanceReached(_) => "05",
        EngineError::Misconfigured(_) | EngineError::Database(_) => "99",
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Misconfigured(reason) => {
            tracing::error!("engine misconfigured: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                code_for_engine_error(&err),
                message_for_engine_error(err),
            ),
            ServerError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "98",
                "request timed out".to_string(),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "02", err),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            error,
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
