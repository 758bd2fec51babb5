//! Donation routes: remaining balance, payment confirmation and cancellation.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use kafala_shared::types::DonationId;

use crate::AppState;
use crate::error::ledger_error_response;
use crate::middleware::Auth;

/// Creates donation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/donations/{donation_id}/remaining", get(get_remaining))
        .route("/donations/{donation_id}/confirm", post(confirm_donation))
        .route("/donations/{donation_id}/cancel", post(cancel_donation))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body of a payment confirmation.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmDonationRequest {
    /// Bank or wallet reference of the payment.
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Internal notes.
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// Body of a cancellation.
#[derive(Debug, Default, Deserialize)]
pub struct CancelDonationRequest {
    /// Internal notes.
    #[serde(default)]
    pub admin_notes: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/donations/{donation_id}/remaining`
async fn get_remaining(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(donation_id): Path<DonationId>,
) -> impl IntoResponse {
    match state.ledger.donation_remaining(&ctx, donation_id).await {
        Ok(balance) => (StatusCode::OK, Json(balance)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/donations/{donation_id}/confirm`
/// Marks a pending pledge as paid.
async fn confirm_donation(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(donation_id): Path<DonationId>,
    payload: Option<Json<ConfirmDonationRequest>>,
) -> impl IntoResponse {
    let Json(payload) = payload.unwrap_or_default();
    match state
        .ledger
        .confirm_donation(
            &ctx,
            donation_id,
            payload.payment_reference,
            payload.admin_notes,
        )
        .await
    {
        Ok(donation) => {
            info!(donation_id = %donation_id, admin_id = %ctx.user_id, "Donation confirmed");
            (StatusCode::OK, Json(donation)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/donations/{donation_id}/cancel`
async fn cancel_donation(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(donation_id): Path<DonationId>,
    payload: Option<Json<CancelDonationRequest>>,
) -> impl IntoResponse {
    let Json(payload) = payload.unwrap_or_default();
    match state
        .ledger
        .cancel_donation(&ctx, donation_id, payload.admin_notes)
        .await
    {
        Ok(donation) => {
            info!(donation_id = %donation_id, admin_id = %ctx.user_id, "Donation cancelled");
            (StatusCode::OK, Json(donation)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use kafala_core::ledger::DonationType;
    use kafala_core::workflow::PledgeInput;

    use crate::test_support::{TestApp, body_json, request};

    #[tokio::test]
    async fn test_confirm_then_cancel_is_rejected() {
        let app = TestApp::new();
        let case = app.seed_case(true).await;
        let pledged = app
            .state
            .ledger
            .pledge(
                case.id,
                PledgeInput {
                    donation_type: DonationType::Monthly,
                    months: Some(1),
                    custom_amount: None,
                    donor_name: None,
                    donor_email: None,
                },
            )
            .await
            .unwrap();
        let token = app.admin_token().await;

        let confirmed = app
            .router()
            .oneshot(request(
                "POST",
                &format!("/api/v1/donations/{}/confirm", pledged.id),
                Some(&token),
                Some(json!({ "payment_reference": "BANK-77" })),
            ))
            .await
            .unwrap();
        assert_eq!(confirmed.status(), StatusCode::OK);
        let body = body_json(confirmed).await;
        assert_eq!(body["status"], "confirmed");
        assert_eq!(body["payment_reference"], "BANK-77");

        let cancelled = app
            .router()
            .oneshot(request(
                "POST",
                &format!("/api/v1/donations/{}/cancel", pledged.id),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(cancelled.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_remaining_of_unknown_donation_is_not_found() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(request(
                "GET",
                &format!("/api/v1/donations/{}/remaining", uuid::Uuid::nil()),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
