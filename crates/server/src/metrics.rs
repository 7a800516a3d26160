//! Prometheus metrics for the HTTP layer.
//!
//! All metrics live in a dedicated registry (prefix `ledger`) owned by the
//! server state and are rendered at `GET /metrics`.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use engine::{Applied, Direction, EngineError};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TEXT_FORMAT, TextEncoder,
};

use crate::server::ServerState;

/// Business outcome of a balance mutation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Committed,
    Replayed,
    InsufficientFunds,
    Rejected,
    Failed,
}

impl MutationOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Replayed => "replayed",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl From<&Result<Applied, EngineError>> for MutationOutcome {
    fn from(result: &Result<Applied, EngineError>) -> Self {
        match result {
            Ok(Applied::Committed) => Self::Committed,
            Ok(Applied::Replayed) => Self::Replayed,
            Err(EngineError::InsufficientFunds(_)) => Self::InsufficientFunds,
            Err(EngineError::Database(_) | EngineError::Misconfigured(_)) => Self::Failed,
            Err(_) => Self::Rejected,
        }
    }
}

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    balance_mutations_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("ledger".into()), None)?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests by route and status"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let balance_mutations_total = IntCounterVec::new(
            Opts::new(
                "balance_mutations_total",
                "Balance mutation requests by direction and outcome",
            ),
            &["direction", "outcome"],
        )?;
        registry.register(Box::new(balance_mutations_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            balance_mutations_total,
        })
    }

    pub fn record_mutation(&self, direction: Direction, outcome: MutationOutcome) {
        let direction = match direction {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        };
        self.balance_mutations_total
            .with_label_values(&[direction, outcome.as_str()])
            .inc();
    }

    fn observe_request(&self, method: &str, path: &str, status: StatusCode, seconds: f64) {
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(seconds);
    }

    fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

pub(crate) async fn track_requests(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    state.metrics.observe_request(
        &method,
        &path,
        response.status(),
        started.elapsed().as_secs_f64(),
    );
    response
}

pub async fn render(State(state): State<ServerState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(err) => {
            tracing::error!("failed to render metrics: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
