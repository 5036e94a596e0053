// SPDX-License-Identifier: MIT

//! Signed session tokens (HS256), independent of storage.
//!
//! Access and refresh tokens share one claims shape and signing key; they
//! differ only in lifetime. Verification checks signature and expiry, not
//! which kind of token was presented.

use crate::config::Config;
use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_signing_key),
            decoding_key: DecodingKey::from_secret(&config.jwt_signing_key),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        }
    }

    /// Issue a short-lived access token for the given subject.
    pub fn issue_access(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, self.access_ttl_secs)
    }

    /// Issue a long-lived refresh token for the given subject.
    pub fn issue_refresh(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, self.refresh_ttl_secs)
    }

    fn issue(&self, subject: &str, ttl_secs: i64) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now as usize,
            exp: (now + ttl_secs) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Token encoding failed: {}", e)))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Access token lifetime, reported as `expiresIn` on sessions.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_secs
    }
}
