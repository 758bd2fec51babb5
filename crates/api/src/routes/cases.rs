//! Case routes: funding progress, available donations, donor pledges and
//! admin case management.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::info;

use kafala_core::ledger::Case;
use kafala_core::workflow::{CaseChanges, CaseInput, PledgeInput};
use kafala_shared::types::CaseId;

use crate::AppState;
use crate::error::ledger_error_response;
use crate::middleware::{Auth, MaybeAuth};

/// Routes open to anonymous donors.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/cases", get(list_published_cases))
        .route("/cases/{case_id}/funding", get(get_case_funding))
        .route("/cases/{case_id}/donations", post(create_pledge))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{case_id}/donations/available",
            get(list_available_donations),
        )
        .route("/admin/cases", get(list_all_cases).post(create_case))
        .route("/admin/cases/{case_id}", put(update_case))
}

// ============================================================================
// Response Types
// ============================================================================

/// A published case as shown to donors.
#[derive(Debug, Serialize)]
pub struct CaseResponse {
    /// Case ID.
    pub id: CaseId,
    /// Title.
    pub title: String,
    /// Arabic title.
    pub title_ar: Option<String>,
    /// Monthly cost.
    pub monthly_cost: String,
    /// Months needed.
    pub months_needed: Option<i32>,
    /// Lifecycle status.
    pub lifecycle_status: String,
}

impl From<Case> for CaseResponse {
    fn from(case: Case) -> Self {
        Self {
            id: case.id,
            title: case.title,
            title_ar: case.title_ar,
            monthly_cost: case.monthly_cost.to_string(),
            months_needed: case.months_needed,
            lifecycle_status: case.lifecycle_status.as_str().to_string(),
        }
    }
}

/// A freshly created pledge with the payment instructions.
#[derive(Debug, Serialize)]
pub struct PledgeResponse {
    /// Donation ID.
    pub donation_id: String,
    /// Amount to pay.
    pub amount: String,
    /// Months pledged.
    pub months_pledged: i32,
    /// Code to quote with the payment.
    pub payment_code: String,
    /// Always `pending` until an admin confirms the payment.
    pub status: &'static str,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/cases`
async fn list_published_cases(State(state): State<AppState>) -> impl IntoResponse {
    match state.ledger.published_cases().await {
        Ok(cases) => {
            let cases: Vec<CaseResponse> = cases.into_iter().map(CaseResponse::from).collect();
            (StatusCode::OK, Json(cases)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cases/{case_id}/funding`
async fn get_case_funding(
    State(state): State<AppState>,
    MaybeAuth(ctx): MaybeAuth,
    Path(case_id): Path<CaseId>,
) -> impl IntoResponse {
    match state.ledger.case_funding(ctx.as_ref(), case_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/cases/{case_id}/donations`
async fn create_pledge(
    State(state): State<AppState>,
    MaybeAuth(ctx): MaybeAuth,
    Path(case_id): Path<CaseId>,
    Json(payload): Json<PledgeInput>,
) -> impl IntoResponse {
    match state.ledger.pledge(case_id, payload).await {
        Ok(donation) => {
            info!(
                case_id = %case_id,
                donation_id = %donation.id,
                signed_in = ctx.is_some(),
                "Pledge created"
            );
            let response = PledgeResponse {
                donation_id: donation.id.to_string(),
                amount: donation.amount.to_string(),
                months_pledged: donation.months_pledged,
                payment_code: donation.payment_code,
                status: donation.status.as_str(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cases/{case_id}/donations/available`
async fn list_available_donations(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(case_id): Path<CaseId>,
) -> impl IntoResponse {
    match state.ledger.available_donations(&ctx, case_id).await {
        Ok(available) => (StatusCode::OK, Json(available)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/admin/cases`
/// Every case, including unpublished ones.
async fn list_all_cases(State(state): State<AppState>, Auth(ctx): Auth) -> impl IntoResponse {
    match state.ledger.all_cases(&ctx).await {
        Ok(cases) => (StatusCode::OK, Json(cases)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/admin/cases`
async fn create_case(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Json(payload): Json<CaseInput>,
) -> impl IntoResponse {
    match state.ledger.create_case(&ctx, payload).await {
        Ok(case) => (StatusCode::CREATED, Json(case)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// PUT `/admin/cases/{case_id}`
/// Edits case fields; absent fields are kept.
async fn update_case(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(case_id): Path<CaseId>,
    Json(payload): Json<CaseChanges>,
) -> impl IntoResponse {
    match state.ledger.update_case(&ctx, case_id, payload).await {
        Ok(case) => {
            info!(case_id = %case_id, lifecycle_status = %case.lifecycle_status, "Case updated");
            (StatusCode::OK, Json(case)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use kafala_shared::auth::Role;
    use kafala_shared::types::UserId;

    use crate::test_support::{TestApp, body_json, request, token_for};

    #[tokio::test]
    async fn test_list_only_shows_published_cases() {
        let app = TestApp::new();
        let published = app.seed_case(true).await;
        app.seed_case(false).await;

        let response = app
            .router()
            .oneshot(request("GET", "/api/v1/cases", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let cases = body.as_array().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0]["id"], published.id.to_string());
    }

    #[tokio::test]
    async fn test_unpublished_funding_is_hidden_from_donors() {
        let app = TestApp::new();
        let case = app.seed_case(false).await;
        let uri = format!("/api/v1/cases/{}/funding", case.id);

        let anonymous = app
            .router()
            .oneshot(request("GET", &uri, None, None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

        let token = app.admin_token().await;
        let admin = app
            .router()
            .oneshot(request("GET", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(admin.status(), StatusCode::OK);
        assert_eq!(body_json(admin).await["case_id"], case.id.to_string());
    }

    #[tokio::test]
    async fn test_anonymous_pledge_is_pending() {
        let app = TestApp::new();
        let case = app.seed_case(true).await;

        let response = app
            .router()
            .oneshot(request(
                "POST",
                &format!("/api/v1/cases/{}/donations", case.id),
                None,
                Some(json!({ "donation_type": "monthly", "months": 2 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["months_pledged"], 2);
        assert_eq!(body["amount"], "600");
        assert!(!body["payment_code"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_token_on_open_route_is_rejected() {
        let app = TestApp::new();
        let case = app.seed_case(true).await;
        let forged = token_for(UserId::new(), "some-other-secret");

        let response = app
            .router()
            .oneshot(request(
                "GET",
                &format!("/api/v1/cases/{}/funding", case.id),
                Some(&forged),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_available_donations_require_admin() {
        let app = TestApp::new();
        let case = app.seed_case(true).await;
        let uri = format!("/api/v1/cases/{}/donations/available", case.id);

        let anonymous = app
            .router()
            .oneshot(request("GET", &uri, None, None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let donor = app.login(UserId::new(), &[Role::Donor]).await;
        let forbidden = app
            .router()
            .oneshot(request("GET", &uri, Some(&donor), None))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        app.confirmed_donation(&case, 2).await;
        let admin = app.admin_token().await;
        let response = app
            .router()
            .oneshot(request("GET", &uri, Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["remaining"], "600");
    }

    #[tokio::test]
    async fn test_admin_creates_and_edits_case() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let created = app
            .router()
            .oneshot(request(
                "POST",
                "/api/v1/admin/cases",
                Some(&token),
                Some(json!({
                    "title": "Widow with three children",
                    "monthly_cost": "450",
                    "months_needed": 12,
                })),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let case = body_json(created).await;
        assert_eq!(case["lifecycle_status"], "active");
        assert_eq!(case["is_published"], false);
        let id = case["id"].as_str().unwrap().to_string();

        let published = app
            .router()
            .oneshot(request(
                "PUT",
                &format!("/api/v1/admin/cases/{id}"),
                Some(&token),
                Some(json!({ "is_published": true, "title_ar": "أرملة مع ثلاثة أطفال" })),
            ))
            .await
            .unwrap();
        assert_eq!(published.status(), StatusCode::OK);

        let listed = app
            .router()
            .oneshot(request("GET", "/api/v1/cases", None, None))
            .await
            .unwrap();
        let cases = body_json(listed).await;
        assert_eq!(cases.as_array().unwrap().len(), 1);
        assert_eq!(cases[0]["title_ar"], "أرملة مع ثلاثة أطفال");

        let completed = app
            .router()
            .oneshot(request(
                "PUT",
                &format!("/api/v1/admin/cases/{id}"),
                Some(&token),
                Some(json!({ "lifecycle_status": "completed" })),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(completed).await["lifecycle_status"], "completed");

        let pledge = app
            .router()
            .oneshot(request(
                "POST",
                &format!("/api/v1/cases/{id}/donations"),
                None,
                Some(json!({ "donation_type": "monthly", "months": 1 })),
            ))
            .await
            .unwrap();
        assert_eq!(pledge.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_case_management_is_admin_only() {
        let app = TestApp::new();
        let case = app.seed_case(false).await;
        let volunteer = app.login(UserId::new(), &[Role::Volunteer]).await;

        let response = app
            .router()
            .oneshot(request(
                "PUT",
                &format!("/api/v1/admin/cases/{}", case.id),
                Some(&volunteer),
                Some(json!({ "is_published": true })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = app.admin_token().await;
        let all = app
            .router()
            .oneshot(request("GET", "/api/v1/admin/cases", Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(body_json(all).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_case_fields_are_rejected() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(request(
                "POST",
                "/api/v1/admin/cases",
                Some(&token),
                Some(json!({ "title": "Family", "monthly_cost": "0" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "INVALID_CASE");
    }
}
