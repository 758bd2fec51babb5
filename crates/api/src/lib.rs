//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for funding, donations, handovers, reports and followups
//! - Authentication middleware building the explicit [`AuthContext`]
//! - Error mapping to JSON bodies
//!
//! [`AuthContext`]: kafala_shared::AuthContext

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use kafala_core::storage::ReportImageStore;
use kafala_db::LedgerService;
use kafala_shared::JwtVerifier;
use kafala_shared::config::LedgerConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger operations.
    pub ledger: LedgerService,
    /// Verifier for identity provider tokens.
    pub jwt: Arc<JwtVerifier>,
    /// Report image storage (optional).
    pub storage: Option<Arc<ReportImageStore>>,
    /// Reporting defaults.
    pub ledger_config: Arc<LedgerConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
