// SPDX-License-Identifier: MIT

//! Shared test fixtures: in-memory store wiring and a scripted fake
//! Google exchange so flows run without the network.

use async_trait::async_trait;
use auth_service::config::Config;
use auth_service::db::MemoryStore;
use auth_service::error::AppError;
use auth_service::routes::create_router;
use auth_service::services::{
    AuthService, GoogleTokenResponse, GoogleUserInfo, OAuthExchange, TokenService,
};
use auth_service::AppState;
use dashmap::DashMap;
use std::sync::Arc;

/// Fake OAuth exchange: authorization codes are scripted to profiles.
/// Unscripted codes fail the way the real client normalizes failures.
#[derive(Default)]
pub struct FakeExchange {
    profiles: DashMap<String, GoogleUserInfo>,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an authorization code to resolve to the given profile.
    pub fn script(&self, code: &str, profile: GoogleUserInfo) {
        self.profiles.insert(code.to_string(), profile);
    }
}

#[async_trait]
impl OAuthExchange for FakeExchange {
    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: Option<&str>,
    ) -> Result<GoogleTokenResponse, AppError> {
        if !self.profiles.contains_key(code) {
            return Err(AppError::BadRequest(
                "Failed to authenticate with Google".to_string(),
            ));
        }
        Ok(GoogleTokenResponse {
            access_token: Some(format!("fake-google-access-{}", code)),
            expires_in: Some(3599),
            refresh_token: None,
            scope: Some("openid email profile".to_string()),
            token_type: Some("Bearer".to_string()),
            id_token: None,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        access_token
            .strip_prefix("fake-google-access-")
            .and_then(|code| self.profiles.get(code).map(|p| p.clone()))
            .ok_or_else(|| {
                AppError::BadRequest("Failed to get user information from Google".to_string())
            })
    }
}

/// A Google profile with the usual fields filled in.
#[allow(dead_code)]
pub fn google_profile(sub: &str, email: &str) -> GoogleUserInfo {
    GoogleUserInfo {
        sub: Some(sub.to_string()),
        email: Some(email.to_string()),
        email_verified: Some(true),
        name: Some("Test User".to_string()),
        given_name: Some("Test".to_string()),
        family_name: Some("User".to_string()),
        picture: Some("https://lh3.example.com/photo.jpg".to_string()),
        locale: Some("en".to_string()),
    }
}

/// Orchestrator over an in-memory store and fake exchange.
#[allow(dead_code)]
pub fn test_auth_service() -> (AuthService, Arc<MemoryStore>, Arc<FakeExchange>) {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let exchange = Arc::new(FakeExchange::new());
    let auth = AuthService::new(
        store.clone(),
        store.clone(),
        exchange.clone(),
        TokenService::new(&config),
    );
    (auth, store, exchange)
}

/// Full router over in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<FakeExchange>) {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let exchange = Arc::new(FakeExchange::new());
    let auth = AuthService::new(
        store.clone(),
        store,
        exchange.clone(),
        TokenService::new(&config),
    );

    let state = Arc::new(AppState { config, auth });
    (create_router(state.clone()), state, exchange)
}
