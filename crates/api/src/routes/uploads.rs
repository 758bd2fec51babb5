//! Report image upload.
//!
//! The image is sent as the raw request body with its `Content-Type`, which
//! alone decides the stored key's extension. The returned URL is what a
//! handover stores as `report_image_url`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;
use tracing::info;

use kafala_shared::AppError;
use kafala_shared::auth::Role;

use crate::AppState;
use crate::error::{app_error_response, storage_error_response};
use crate::middleware::Auth;

/// Request body cap. Must stay above the store's file size limit.
const UPLOAD_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Creates upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/uploads/report-image",
        post(upload_report_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
}

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL of the image.
    pub url: String,
    /// Storage key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// POST `/uploads/report-image`
async fn upload_report_image(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Err(e) = ctx.require_role(Role::Admin) {
        return app_error_response(&e);
    }

    let Some(store) = state.storage.as_ref() else {
        return app_error_response(&AppError::StorageNotConfigured);
    };

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    match store.upload(body.to_vec(), content_type).await {
        Ok(stored) => {
            info!(
                key = %stored.key,
                size = stored.size,
                provider = store.provider_name(),
                admin_id = %ctx.user_id,
                "Report image uploaded"
            );
            (
                StatusCode::CREATED,
                Json(UploadResponse {
                    url: stored.url,
                    key: stored.key,
                    size: stored.size,
                }),
            )
                .into_response()
        }
        Err(e) => storage_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::header::AUTHORIZATION};
    use tower::ServiceExt;

    use kafala_core::storage::{ReportImageStore, StorageConfig, StorageProvider};
    use kafala_shared::types::UserId;

    use super::*;
    use crate::test_support::{TestApp, body_json};

    fn upload(token: &str, content_type: &str, bytes: &'static [u8]) -> Request<Body> {
        upload_to("/api/v1/uploads/report-image", token, content_type, bytes)
    }

    fn upload_to(uri: &str, token: &str, content_type: &str, bytes: &'static [u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(bytes))
            .unwrap()
    }

    fn local_store() -> ReportImageStore {
        let root = std::env::temp_dir().join(format!("kafala-uploads-{}", uuid::Uuid::new_v4()));
        let config = StorageConfig::new(
            StorageProvider::LocalFs { root },
            "https://cdn.example.org/case-images",
        );
        ReportImageStore::from_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_upload_without_storage_returns_503() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(upload(&token, "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"], "STORAGE_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let app = TestApp::with_storage(Some(local_store()));
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(upload(&token, "image/png", b"\x89PNG fake image"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let url = body["url"].as_str().unwrap();
        assert!(url.starts_with("https://cdn.example.org/case-images/reports/"));
        assert_eq!(body["size"], 15);
    }

    #[tokio::test]
    async fn test_client_filename_does_not_pick_the_extension() {
        let app = TestApp::with_storage(Some(local_store()));
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(upload_to(
                "/api/v1/uploads/report-image?filename=page.html",
                &token,
                "image/png",
                b"\x89PNG",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let key = body["key"].as_str().unwrap();
        assert!(key.ends_with(".png"), "{key}");
        assert!(!key.contains("html"));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let app = TestApp::with_storage(Some(local_store()));
        let token = app.admin_token().await;

        let response = app
            .router()
            .oneshot(upload(&token, "application/pdf", b"%PDF-1.4"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_is_admin_only() {
        let app = TestApp::with_storage(Some(local_store()));
        let token = app.login(UserId::new(), &[Role::Volunteer]).await;

        let response = app
            .router()
            .oneshot(upload(&token, "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "FORBIDDEN");
        assert_eq!(body["message"], "Access denied: admin role required");
    }
}
