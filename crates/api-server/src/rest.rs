//! Shared REST state, error mapping, and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use studio_core::LoyaltyError;
use studio_ledger::LedgerStore;
use studio_loyalty::RewardEngine;
use studio_reporting::SummaryQuery;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LedgerStore>,
    pub engine: Arc<RewardEngine>,
    pub summaries: Arc<SummaryQuery>,
    pub node_id: String,
    pub start_time: Instant,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Map a core error to its HTTP surface. Retryable store failures come
/// back as 503 so callers know a full retry is safe.
pub fn map_error(err: LoyaltyError) -> (StatusCode, Json<ErrorResponse>) {
    metrics::counter!("loyalty.api.errors").increment(1);
    let (status, code) = match &err {
        LoyaltyError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
        LoyaltyError::UnknownClient(_) => (StatusCode::NOT_FOUND, "unknown_client"),
        LoyaltyError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe for Kubernetes.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
