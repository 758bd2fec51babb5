//! Reporting routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use kafala_core::ledger::MonthKey;
use kafala_core::reports::MonthWindow;

use crate::AppState;
use crate::error::{ledger_error_response, report_error_response};
use crate::middleware::Auth;

/// Creates report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/monthly", get(get_monthly_rollup))
        .route("/reports/donations-by-month", get(get_donations_by_month))
        .route("/reports/donations-by-case", get(get_donations_by_case))
        .route("/reports/legacy-redemptions", get(get_legacy_redemptions))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for the monthly rollup.
#[derive(Debug, Deserialize)]
pub struct MonthlyRollupQuery {
    /// Number of months ending with the current one.
    pub months: Option<u32>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/reports/monthly`
/// Lifecycle events and spending per month over a trailing window.
async fn get_monthly_rollup(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Query(query): Query<MonthlyRollupQuery>,
) -> impl IntoResponse {
    let config = &state.ledger_config;
    let end = MonthKey::from_date(Utc::now().date_naive());
    let months = query.months.unwrap_or(config.report_window_months);

    let window = match MonthWindow::bounded(end, months, config.max_report_window_months) {
        Ok(window) => window,
        Err(e) => return report_error_response(&e),
    };

    match state.ledger.monthly_rollup(&ctx, &window).await {
        Ok(rollup) => (StatusCode::OK, Json(rollup)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/reports/donations-by-month`
async fn get_donations_by_month(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> impl IntoResponse {
    match state.ledger.monthly_donations(&ctx).await {
        Ok(months) => (StatusCode::OK, Json(months)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/reports/donations-by-case`
async fn get_donations_by_case(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> impl IntoResponse {
    match state.ledger.donations_by_case(&ctx).await {
        Ok(cases) => (StatusCode::OK, Json(cases)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/reports/legacy-redemptions`
/// Donations redeemed before per-handover tracking, grouped per case.
async fn get_legacy_redemptions(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> impl IntoResponse {
    match state.ledger.legacy_redemptions(&ctx).await {
        Ok(cases) => (StatusCode::OK, Json(cases)).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;
    use tower::ServiceExt;

    use kafala_shared::auth::Role;
    use kafala_shared::types::UserId;

    use crate::test_support::{TestApp, body_json, request};

    #[tokio::test]
    async fn test_monthly_defaults_to_configured_window() {
        let app = TestApp::new();
        app.seed_case(true).await;
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(request("GET", "/api/v1/reports/monthly", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let expected = app.state.ledger_config.report_window_months as usize;
        assert_eq!(body["buckets"].as_array().unwrap().len(), expected);
        assert_eq!(body["totals"]["new_cases"], 1);
    }

    #[rstest]
    #[case("?months=0", "EMPTY_WINDOW")]
    #[case("?months=61", "WINDOW_TOO_LARGE")]
    #[tokio::test]
    async fn test_monthly_rejects_bad_windows(#[case] query: &str, #[case] code: &str) {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(request(
                "GET",
                &format!("/api/v1/reports/monthly{query}"),
                Some(&token),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], code);
    }

    #[rstest]
    #[case("/api/v1/reports/donations-by-month")]
    #[case("/api/v1/reports/donations-by-case")]
    #[case("/api/v1/reports/legacy-redemptions")]
    #[tokio::test]
    async fn test_reports_are_admin_only(#[case] uri: &str) {
        let app = TestApp::new();
        let volunteer = app.login(UserId::new(), &[Role::Volunteer]).await;
        let admin = app.admin_token().await;

        let denied = app
            .router()
            .oneshot(request("GET", uri, Some(&volunteer), None))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let allowed = app
            .router()
            .oneshot(request("GET", uri, Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_donations_by_case_counts_confirmed() {
        let app = TestApp::new();
        let case = app.seed_case(true).await;
        app.confirmed_donation(&case, 3).await;
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(request(
                "GET",
                "/api/v1/reports/donations-by-case",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0]["stats"]["confirmed_count"], 1);
        assert_eq!(body[0]["stats"]["confirmed_amount"], "900");
    }
}
