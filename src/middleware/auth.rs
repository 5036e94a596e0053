// SPDX-License-Identifier: MIT

//! JWT authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated subject extracted from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

/// Middleware that requires a valid, non-revoked bearer token.
///
/// The revocation set is consulted on every authenticated request, so
/// logout takes effect despite token statelessness.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let claims = state
        .auth
        .tokens()
        .verify(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    match state.auth.is_revoked(&token).await {
        Ok(false) => {}
        Ok(true) => return Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!(error = %e, "Revocation lookup failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let auth_user = AuthUser { email: claims.sub };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
