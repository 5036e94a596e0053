// SPDX-License-Identifier: MIT

//! Google OAuth 2.0 client for the authorization-code flow:
//! 1. Exchange authorization code for an access token
//! 2. Use the access token to retrieve user information
//!
//! All provider failures (network errors, non-2xx responses, malformed
//! bodies, missing fields) normalize into `BadRequest` so callers never
//! see provider-specific error shapes. Calls carry a single client-level
//! timeout and are never retried.

use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Timeout for each provider round trip.
const PROVIDER_TIMEOUT_SECS: u64 = 10;

const EXCHANGE_FAILED: &str = "Failed to authenticate with Google";
const USERINFO_FAILED: &str = "Failed to get user information from Google";

/// Token exchange response from Google's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
}

/// User profile from Google's userinfo endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleUserInfo {
    /// Google's stable subject identifier
    pub sub: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
}

/// The two-step provider handshake, as a seam so the orchestrator can be
/// exercised without the network.
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    /// Exchange an authorization code for a provider access token.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<GoogleTokenResponse, AppError>;

    /// Fetch the user profile behind a provider access token.
    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleUserInfo, AppError>;
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    default_redirect_uri: String,
    token_uri: String,
    userinfo_uri: String,
}

impl GoogleOAuthClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            default_redirect_uri: config.google_redirect_uri.clone(),
            token_uri: config.google_token_uri.clone(),
            userinfo_uri: config.google_userinfo_uri.clone(),
        }
    }
}

#[async_trait]
impl OAuthExchange for GoogleOAuthClient {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<GoogleTokenResponse, AppError> {
        let effective_redirect_uri = redirect_uri.unwrap_or(&self.default_redirect_uri);

        tracing::info!("Exchanging authorization code for Google access token");

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", effective_redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google token exchange request failed");
                AppError::BadRequest(EXCHANGE_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::BadRequest(EXCHANGE_FAILED.to_string()));
        }

        let token_response: GoogleTokenResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Google token response");
            AppError::BadRequest(EXCHANGE_FAILED.to_string())
        })?;

        if token_response.access_token.is_none() {
            tracing::error!("Google token response missing access token");
            return Err(AppError::BadRequest(EXCHANGE_FAILED.to_string()));
        }

        tracing::info!("Successfully obtained Google access token");
        Ok(token_response)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        tracing::info!("Retrieving user info from Google");

        let response = self
            .http
            .get(&self.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google userinfo request failed");
                AppError::BadRequest(USERINFO_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google userinfo retrieval failed");
            return Err(AppError::BadRequest(USERINFO_FAILED.to_string()));
        }

        let userinfo: GoogleUserInfo = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Google userinfo response");
            AppError::BadRequest(USERINFO_FAILED.to_string())
        })?;

        if userinfo.email.is_none() {
            tracing::error!("Google userinfo missing email");
            return Err(AppError::BadRequest(USERINFO_FAILED.to_string()));
        }

        Ok(userinfo)
    }
}
