//! Followup action routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use kafala_db::service::FollowupInput;
use kafala_shared::types::{CaseId, FollowupActionId};

use crate::AppState;
use crate::error::ledger_error_response;
use crate::middleware::Auth;

/// Creates followup routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{case_id}/followups",
            get(list_followups).post(create_followup),
        )
        .route("/followups/{followup_id}/complete", post(complete_followup))
        .route("/followups/{followup_id}/cancel", post(cancel_followup))
}

/// Body of a completion.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteFollowupRequest {
    /// Answer matching the followup's answer type.
    #[serde(default)]
    pub answer: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub completion_notes: Option<String>,
}

/// GET `/cases/{case_id}/followups`
async fn list_followups(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(case_id): Path<CaseId>,
) -> impl IntoResponse {
    match state.ledger.followups_for_case(&ctx, case_id).await {
        Ok(followups) => (StatusCode::OK, Json(followups)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/cases/{case_id}/followups`
async fn create_followup(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(case_id): Path<CaseId>,
    Json(payload): Json<FollowupInput>,
) -> impl IntoResponse {
    match state.ledger.create_followup(&ctx, case_id, payload).await {
        Ok(followup) => {
            info!(followup_id = %followup.id, case_id = %case_id, "Followup created");
            (StatusCode::CREATED, Json(followup)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/followups/{followup_id}/complete`
async fn complete_followup(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(followup_id): Path<FollowupActionId>,
    payload: Option<Json<CompleteFollowupRequest>>,
) -> impl IntoResponse {
    let Json(payload) = payload.unwrap_or_default();
    match state
        .ledger
        .complete_followup(&ctx, followup_id, payload.answer, payload.completion_notes)
        .await
    {
        Ok(followup) => (StatusCode::OK, Json(followup)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/followups/{followup_id}/cancel`
async fn cancel_followup(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(followup_id): Path<FollowupActionId>,
) -> impl IntoResponse {
    match state.ledger.cancel_followup(&ctx, followup_id).await {
        Ok(followup) => (StatusCode::OK, Json(followup)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}
