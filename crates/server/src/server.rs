use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use std::{sync::Arc, time::Duration};

use crate::{ServerError, balance, health, metrics, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub metrics: metrics::Metrics,
    pub request_timeout: Duration,
}

/// Tunables for the HTTP layer.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    /// Requests still running after this long answer `503`; the dropped
    /// handler future rolls back any open database transaction.
    pub request_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}

async fn request_timeout(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    match tokio::time::timeout(state.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("request to {uri} timed out after {:?}", state.request_timeout);
            ServerError::Timeout.into_response()
        }
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/user", post(user::create))
        .route("/user/balance/increase", post(balance::increase))
        .route("/user/balance/reduce", post(balance::reduce))
        .route("/user/balance/{guid}", get(balance::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), request_timeout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track_requests,
        ))
        .route("/health", get(health::get))
        .route("/metrics", get(metrics::render))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the application router without binding a listener.
pub fn app(engine: Engine, options: ServerOptions) -> Result<Router, std::io::Error> {
    let state = ServerState {
        engine: Arc::new(engine),
        metrics: metrics::Metrics::new().map_err(std::io::Error::other)?,
        request_timeout: options.request_timeout,
    };

    Ok(router(state))
}

pub async fn run_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, options)?).await
}
