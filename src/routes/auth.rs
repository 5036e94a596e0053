// SPDX-License-Identifier: MIT

//! Authentication route handlers under `/api/v1/auth`.
//!
//! Handlers deserialize requests, validate them, call into the
//! orchestrator with explicit arguments, and shape results into the
//! `ApiResponse` envelope. The authenticated subject comes from the
//! `AuthUser` extension injected by the auth middleware.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AccountTier, AuthProvider, User};
use crate::routes::ApiResponse;
use crate::services::Session;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/google", post(login_with_google))
        .route("/api/v1/auth/refresh-token", post(refresh_token))
        .route("/api/v1/auth/logout", post(logout))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/auth/change-password", post(change_password))
        .route("/api/v1/auth/upgrade-account", put(upgrade_account))
}

// ─── Request DTOs ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[validate(length(min = 1, message = "Authorization code is required"))]
    pub code: String,
    /// Optional: must match the redirect URI registered with Google.
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeAccountRequest {
    pub account_tier: AccountTier,
}

// ─── Response DTOs ───────────────────────────────────────────

/// Session payload returned by register/login/google/refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// User summary projection embedded in sessions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_tier: AccountTier,
    pub auth_provider: AuthProvider,
    pub profile_picture_url: Option<String>,
}

/// Full profile returned by /me and /upgrade-account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: bool,
    pub account_tier: AccountTier,
    pub auth_provider: AuthProvider,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let user = session.user;
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            user: UserSummary {
                id: user.id,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                account_tier: user.account_tier,
                auth_provider: user.auth_provider,
                profile_picture_url: user.profile_picture_url,
            },
        }
    }
}

impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            enabled: user.enabled,
            account_tier: user.account_tier,
            auth_provider: user.auth_provider,
            profile_picture_url: user.profile_picture_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn validated<T: Validate>(req: &T) -> Result<()> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── Handlers ────────────────────────────────────────────────

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponse>>)> {
    validated(&req)?;

    let session = state
        .auth
        .register(&req.email, &req.password, req.first_name, req.last_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            session.into(),
        )),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    validated(&req)?;

    let session = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::with_message(
        "Login successful",
        session.into(),
    )))
}

async fn login_with_google(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleAuthRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    validated(&req)?;

    let session = state
        .auth
        .login_with_google(&req.code, req.redirect_uri.as_deref())
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Google login successful",
        session.into(),
    )))
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    validated(&req)?;

    let session = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::with_message(
        "Token refreshed successfully",
        session.into(),
    )))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    validated(&req)?;

    state
        .auth
        .change_password(
            &user.email,
            &req.current_password,
            &req.new_password,
            &req.confirm_password,
        )
        .await?;
    Ok(Json(ApiResponse::message_only(
        "Password changed successfully",
    )))
}

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserProfileResponse>>> {
    let profile = state.auth.profile(&user.email).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

/// Logout is public and best-effort: a missing or unparseable bearer
/// token still reports success, so the client can always clear state.
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ApiResponse<()>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if let Some(token) = token {
        state.auth.logout(token).await;
    }

    Json(ApiResponse::message_only("Logged out successfully"))
}

async fn upgrade_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpgradeAccountRequest>,
) -> Result<Json<ApiResponse<UserProfileResponse>>> {
    let updated = state
        .auth
        .upgrade_tier(&user.email, req.account_tier)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Account upgraded successfully",
        updated.into(),
    )))
}
