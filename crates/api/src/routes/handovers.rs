//! Handover routes.
//!
//! Writes go through the ledger service, which validates the amount
//! against the donation's remaining balance and reserves it with a
//! conditional write before the handover row is stored.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::info;

use kafala_db::service::{HandoverInput, HandoverUpdate};
use kafala_shared::types::{CaseId, HandoverId};

use crate::AppState;
use crate::error::ledger_error_response;
use crate::middleware::Auth;

/// Creates handover routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{case_id}/handovers",
            get(list_case_handovers).post(record_handover),
        )
        .route("/handovers/{handover_id}", put(update_handover))
}

/// Query parameters for the handover calendar.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Calendar year; every year when absent.
    pub year: Option<i32>,
}

/// GET `/cases/{case_id}/handovers`
/// Handovers of the case grouped by month.
async fn list_case_handovers(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(case_id): Path<CaseId>,
    Query(query): Query<CalendarQuery>,
) -> impl IntoResponse {
    match state.ledger.case_handovers(&ctx, case_id, query.year).await {
        Ok(months) => (StatusCode::OK, Json(months)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/cases/{case_id}/handovers`
/// Records a handover drawn from one confirmed donation of the case.
async fn record_handover(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(case_id): Path<CaseId>,
    Json(payload): Json<HandoverInput>,
) -> impl IntoResponse {
    match state.ledger.record_handover(&ctx, case_id, payload).await {
        Ok(handover) => {
            info!(
                handover_id = %handover.id,
                case_id = %case_id,
                donation_id = %handover.donation_id,
                amount = %handover.handover_amount,
                "Handover recorded"
            );
            (StatusCode::CREATED, Json(handover)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// PUT `/handovers/{handover_id}`
/// Edits a handover; a `donation_id` moves it to another donation of the case.
async fn update_handover(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(handover_id): Path<HandoverId>,
    Json(payload): Json<HandoverUpdate>,
) -> impl IntoResponse {
    match state
        .ledger
        .update_handover(&ctx, handover_id, payload)
        .await
    {
        Ok(handover) => {
            info!(
                handover_id = %handover_id,
                donation_id = %handover.donation_id,
                amount = %handover.handover_amount,
                "Handover updated"
            );
            (StatusCode::OK, Json(handover)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}
