//! Error responses.
//!
//! Every error body has the shape `{"error": <code>, "message": <text>}`.
//! Server-side failures are logged here so handlers only log successes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use kafala_core::ledger::LedgerError;
use kafala_core::reports::ReportError;
use kafala_core::storage::StorageError;
use kafala_shared::AppError;

/// Builds a JSON error response.
pub fn error_response(status: u16, code: &str, message: impl Into<String>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Maps ledger errors to HTTP responses.
pub fn ledger_error_response(e: &LedgerError) -> Response {
    let status = e.http_status_code();
    match e {
        LedgerError::LedgerInconsistency { .. } => {
            tracing::error!(error = %e, "Ledger inconsistency surfaced to caller");
        }
        LedgerError::StoreUnavailable(_) => {
            tracing::error!(error = %e, "Store unavailable");
        }
        _ if status >= 500 => tracing::error!(error = %e, "Ledger operation failed"),
        _ => tracing::debug!(error = %e, "Ledger request rejected"),
    }
    error_response(status, e.error_code(), e.to_string())
}

/// Maps storage errors to HTTP responses.
pub fn storage_error_response(e: &StorageError) -> Response {
    let status = e.http_status_code();
    if status >= 500 {
        tracing::error!(error = %e, "Report image upload failed");
    }
    error_response(status, e.error_code(), e.to_string())
}

/// Maps report window errors to HTTP responses.
pub fn report_error_response(e: &ReportError) -> Response {
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

/// Maps application errors to HTTP responses.
pub fn app_error_response(e: &AppError) -> Response {
    error_response(e.status_code(), e.error_code(), e.to_string())
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use kafala_core::ledger::AllocationRejection;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_allocation_rejection_body() {
        let e = LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance {
            remaining: dec!(250),
        });
        let response = ledger_error_response(&e);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "EXCEEDS_REMAINING_BALANCE");
        assert!(body["message"].as_str().unwrap().contains("250"));
    }

    #[tokio::test]
    async fn test_inconsistency_is_a_server_error() {
        let e = LedgerError::LedgerInconsistency {
            donation_id: Uuid::nil(),
            amount: dec!(100),
            handed_over: dec!(120),
        };
        let response = ledger_error_response(&e);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "LEDGER_INCONSISTENCY");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ledger_error_response(&LedgerError::ConcurrentModification {
                donation_id: Uuid::nil()
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            storage_error_response(&StorageError::EmptyFile).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            report_error_response(&ReportError::EmptyWindow).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            app_error_response(&AppError::Unauthorized("no token".to_string())).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
