//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::auth::{auth_middleware, optional_auth_middleware},
};

pub mod cases;
pub mod donations;
pub mod followups;
pub mod handovers;
pub mod health;
pub mod reports;
pub mod uploads;

/// Creates the API router with routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Open to donors; a token, when sent, still has to be valid
    let donor_routes = cases::public_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        optional_auth_middleware,
    ));

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(cases::routes())
        .merge(donations::routes())
        .merge(handovers::routes())
        .merge(followups::routes())
        .merge(reports::routes())
        .merge(uploads::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(donor_routes)
        .merge(protected_routes)
}
