//! Authentication middleware for protected routes.
//!
//! The middleware verifies the bearer token, loads the user's roles from the
//! store and puts an [`AuthContext`] in the request extensions. Handlers take
//! it through the [`Auth`] or [`MaybeAuth`] extractors and pass it on
//! explicitly.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use kafala_shared::{AppError, AuthContext, JwtError};

use crate::AppState;
use crate::error::{app_error_response, ledger_error_response};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Builds the auth context for a token, or the response to send instead.
async fn authenticate(state: &AppState, token: &str) -> Result<AuthContext, Response> {
    let claims = state.jwt.verify(token).map_err(|e| {
        let message = match e {
            JwtError::Expired => "Token has expired",
            JwtError::InvalidAudience | JwtError::DecodingError(_) => {
                "Invalid or malformed token"
            }
        };
        app_error_response(&AppError::Unauthorized(message.to_string()))
    })?;

    let user_id = claims.user_id();
    let roles = state
        .ledger
        .repository()
        .roles_for_user(user_id)
        .await
        .map_err(|e| ledger_error_response(&e.into()))?;

    Ok(AuthContext::new(user_id, roles))
}

/// Authentication middleware that requires a valid token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string);

    let Some(token) = token else {
        return app_error_response(&AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ));
    };

    match authenticate(&state, &token).await {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(response) => response,
    }
}

/// Authentication middleware for routes open to anonymous callers.
///
/// A missing header passes through; a present but invalid token is still
/// rejected.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string);

    if let Some(token) = token {
        match authenticate(&state, &token).await {
            Ok(ctx) => {
                request.extensions_mut().insert(ctx);
            }
            Err(response) => return response,
        }
    }

    next.run(request).await
}

/// Extractor for the authenticated caller.
#[derive(Debug, Clone)]
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| {
                app_error_response(&AppError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            })
    }
}

/// Extractor for a caller who may be anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthContext>().cloned()))
    }
}
