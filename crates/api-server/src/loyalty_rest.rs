//! Loyalty REST endpoints: leaderboard, client standing, reward
//! issuance, and booking-completion ingestion.

use crate::rest::{map_error, AppState, ErrorResponse};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use studio_core::loyalty::{
    BookingCompleted, ClientSummary, EarnDisposition, IssueRewardRequest, IssueRewardResponse,
};
use tracing::warn;
use uuid::Uuid;

/// GET /v1/loyalty/summaries — Leaderboard of all enrolled clients,
/// ordered by balance descending, ties broken by earliest enrollment.
pub async fn handle_summaries(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientSummary>>, (StatusCode, Json<ErrorResponse>)> {
    metrics::counter!("loyalty.api.summaries").increment(1);
    state.summaries.list_summaries().map(Json).map_err(map_error)
}

/// GET /v1/loyalty/standing/:client_id — Single-client balance and tier.
pub async fn handle_standing(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientSummary>, (StatusCode, Json<ErrorResponse>)> {
    match state.summaries.summary_for_client(client_id) {
        Ok(Some(summary)) => Ok(Json(summary)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "unknown_client".to_string(),
                message: format!("Unknown client: {client_id}"),
            }),
        )),
        Err(e) => Err(map_error(e)),
    }
}

/// POST /v1/loyalty/rewards — Issue a reward and report the tier
/// transition it caused.
pub async fn handle_issue_reward(
    State(state): State<AppState>,
    Json(request): Json<IssueRewardRequest>,
) -> Result<Json<IssueRewardResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.engine.issue_reward(&request) {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(client_id = %request.client_id, error = %e, "Reward issuance failed");
            Err(map_error(e))
        }
    }
}

/// POST /v1/loyalty/bookings/completed — Ingest a booking-completion
/// event. Replays of the same booking id are acknowledged without a
/// second earn row.
pub async fn handle_booking_completed(
    State(state): State<AppState>,
    Json(event): Json<BookingCompleted>,
) -> Result<Json<EarnDisposition>, (StatusCode, Json<ErrorResponse>)> {
    state
        .store
        .record_booking_completion(&event)
        .map(Json)
        .map_err(map_error)
}
