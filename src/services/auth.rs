// SPDX-License-Identifier: MIT

//! Identity and session orchestration.
//!
//! Composes the user directory, password hasher, token service, revocation
//! store, and Google OAuth client to implement register, login, Google
//! login/link, refresh, change-password, logout, and tier upgrade. The
//! orchestrator itself is stateless; all durable state lives behind the
//! storage traits.

use crate::db::{RevocationStore, UserDirectory};
use crate::error::AppError;
use crate::models::{normalize_email, AccountTier, AuthProvider, RevokedToken, User};
use crate::services::google::{GoogleUserInfo, OAuthExchange};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH: &str = "Invalid or expired refresh token";

/// A freshly issued token pair with the resolved user.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: User,
}

/// The identity and session orchestrator.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    revoked: Arc<dyn RevocationStore>,
    oauth: Arc<dyn OAuthExchange>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        revoked: Arc<dyn RevocationStore>,
        oauth: Arc<dyn OAuthExchange>,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            revoked,
            oauth,
            tokens,
        }
    }

    /// Token service accessor for the request boundary.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // ─── Local Credentials ───────────────────────────────────────────────

    /// Register a new local user and issue a session.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<Session, AppError> {
        let email = normalize_email(email);

        if self.users.exists_by_email(&email).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let digest = hash_password(password)?;
        let user = User::new_local(email.clone(), digest, first_name, last_name);

        // The pre-check above is advisory only: two concurrent registrations
        // can both pass it. The store's atomic create decides the winner and
        // hands the loser a Conflict.
        self.users.create(&user).await?;

        tracing::info!(email = %email, "User registered");
        self.issue_session(user)
    }

    /// Authenticate a local credential and issue a session.
    ///
    /// Prior tokens stay valid; concurrent sessions per user are allowed.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !user.enabled {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        // A user with no digest (Google-only account) can never match.
        let matches = user
            .password_digest
            .as_deref()
            .is_some_and(|digest| verify_password(password, digest));
        if !matches {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!(email = %email, "Login successful");
        self.issue_session(user)
    }

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// The current user record is re-loaded so tier and enabled changes
    /// since issuance are honored. The presented refresh token is not
    /// revoked; it stays valid until natural expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AppError> {
        if self.revoked.contains(refresh_token).await? {
            return Err(AppError::Unauthorized(INVALID_REFRESH.to_string()));
        }

        let claims = self
            .tokens
            .verify(refresh_token)
            .map_err(|_| AppError::Unauthorized(INVALID_REFRESH.to_string()))?;

        let user = self
            .users
            .find_by_email(&normalize_email(&claims.sub))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH.to_string()))?;

        if !user.enabled {
            return Err(AppError::Unauthorized(INVALID_REFRESH.to_string()));
        }

        self.issue_session(user)
    }

    /// Change the stored password digest.
    ///
    /// Already-issued tokens remain valid until natural expiry.
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        if new_password != confirm_password {
            return Err(AppError::BadRequest(
                "New password and confirm password do not match".to_string(),
            ));
        }

        let email = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))?;

        let current_matches = user
            .password_digest
            .as_deref()
            .is_some_and(|digest| verify_password(current_password, digest));
        if !current_matches {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        user.password_digest = Some(hash_password(new_password)?);
        user.updated_at = Utc::now();
        self.users.save(&user).await?;

        tracing::info!(email = %email, "Password changed");
        Ok(())
    }

    // ─── Sessions ────────────────────────────────────────────────────────

    /// Best-effort logout: record the token in the revocation set.
    ///
    /// An unparseable token makes revocation a no-op, not an error; logout
    /// always appears to succeed to the caller.
    pub async fn logout(&self, token: &str) {
        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(_) => {
                tracing::debug!("Logout with unparseable token, skipping revocation");
                return;
            }
        };

        let entry = RevokedToken {
            token: token.to_string(),
            user_email: claims.sub.clone(),
            expires_at: DateTime::from_timestamp(claims.exp as i64, 0).unwrap_or_else(Utc::now),
            revoked_at: Utc::now(),
        };

        match self.revoked.insert(&entry).await {
            Ok(()) => tracing::info!(email = %claims.sub, "Token revoked"),
            Err(e) => tracing::warn!(error = %e, "Failed to record revocation during logout"),
        }
    }

    /// Pure membership query against the revocation set. The request
    /// boundary consults this on every authenticated call.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        self.revoked.contains(token).await
    }

    // ─── Profile & Tier ──────────────────────────────────────────────────

    /// Load the current user record.
    pub async fn profile(&self, email: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        self.users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }

    /// Set the account tier. Rejected only when the account is already VIP
    /// and VIP is requested again.
    pub async fn upgrade_tier(
        &self,
        email: &str,
        requested: AccountTier,
    ) -> Result<User, AppError> {
        let mut user = self.profile(email).await?;

        if user.account_tier == AccountTier::Vip && requested == AccountTier::Vip {
            return Err(AppError::BadRequest("Account is already VIP".to_string()));
        }

        user.account_tier = requested;
        user.updated_at = Utc::now();
        self.users.save(&user).await?;

        tracing::info!(email = %user.email, tier = ?requested, "Account tier updated");
        Ok(user)
    }

    // ─── Google OAuth ────────────────────────────────────────────────────

    /// Authenticate via the Google authorization-code flow.
    ///
    /// Reconciles the external identity against the local directory:
    /// a brand-new email creates a Google user, a returning Google user is
    /// refreshed, and a local user with the same email is linked (digest
    /// preserved, provider flipped). Repeated logins for one provider
    /// subject always converge on the same `User.id`.
    pub async fn login_with_google(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<Session, AppError> {
        tracing::info!("Processing Google OAuth login");

        let token_response = self.oauth.exchange_code(code, redirect_uri).await?;
        let access_token = token_response.access_token.as_deref().ok_or_else(|| {
            AppError::BadRequest("Failed to authenticate with Google".to_string())
        })?;

        let profile = self.oauth.fetch_profile(access_token).await?;
        let email = normalize_email(profile.email.as_deref().ok_or_else(|| {
            AppError::BadRequest("Failed to get user information from Google".to_string())
        })?);

        let user = match self.users.find_by_email(&email).await? {
            Some(existing) => self.reconcile_existing(existing, &profile).await?,
            None => match self.create_google_user(&email, &profile).await {
                Ok(user) => user,
                // Lost the creation race to a concurrent first login for the
                // same subject; adopt the winner's record.
                Err(AppError::Conflict(_)) => {
                    let existing = self.users.find_by_email(&email).await?.ok_or_else(|| {
                        AppError::Database("User missing after create conflict".to_string())
                    })?;
                    self.reconcile_existing(existing, &profile).await?
                }
                Err(e) => return Err(e),
            },
        };

        tracing::info!(email = %user.email, "Google OAuth login successful");
        self.issue_session(user)
    }

    /// Create a new user from a Google profile.
    async fn create_google_user(
        &self,
        email: &str,
        profile: &GoogleUserInfo,
    ) -> Result<User, AppError> {
        tracing::info!(email = %email, "Creating new user from Google OAuth");

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_digest: None,
            first_name: profile.given_name.clone(),
            last_name: profile.family_name.clone(),
            enabled: true,
            account_tier: AccountTier::Standard,
            auth_provider: AuthProvider::Google,
            provider_id: profile.sub.clone(),
            profile_picture_url: profile.picture.clone(),
            created_at: now,
            updated_at: now,
        };

        self.users.create(&user).await?;
        Ok(user)
    }

    /// Reconcile a Google profile against an existing user record.
    async fn reconcile_existing(
        &self,
        user: User,
        profile: &GoogleUserInfo,
    ) -> Result<User, AppError> {
        match user.auth_provider {
            AuthProvider::Google => {
                tracing::info!(email = %user.email, "Existing Google user logging in");
                self.refresh_google_profile(user, profile).await
            }
            // Local user sharing the email: link the Google identity. The
            // password digest is preserved so local login keeps working.
            AuthProvider::Local => {
                tracing::info!(email = %user.email, "Linking Google account to existing local user");
                self.link_google_account(user, profile).await
            }
        }
    }

    /// Returning Google user: refresh the picture if it changed and
    /// backfill the provider id if missing. Saves only when something
    /// actually changed.
    async fn refresh_google_profile(
        &self,
        mut user: User,
        profile: &GoogleUserInfo,
    ) -> Result<User, AppError> {
        let mut updated = false;

        if profile.picture.is_some() && profile.picture != user.profile_picture_url {
            user.profile_picture_url = profile.picture.clone();
            updated = true;
        }
        if user.provider_id.is_none() && profile.sub.is_some() {
            user.provider_id = profile.sub.clone();
            updated = true;
        }

        if updated {
            user.updated_at = Utc::now();
            self.users.save(&user).await?;
        }
        Ok(user)
    }

    /// Link a Google identity to an existing local user: set the provider
    /// subject and picture, backfill empty name fields, and flip the
    /// provider. The digest stays untouched.
    async fn link_google_account(
        &self,
        mut user: User,
        profile: &GoogleUserInfo,
    ) -> Result<User, AppError> {
        user.provider_id = profile.sub.clone();
        user.profile_picture_url = profile.picture.clone();

        if user.first_name.as_deref().map_or(true, str::is_empty) {
            user.first_name = profile.given_name.clone();
        }
        if user.last_name.as_deref().map_or(true, str::is_empty) {
            user.last_name = profile.family_name.clone();
        }

        user.auth_provider = AuthProvider::Google;
        user.updated_at = Utc::now();

        self.users.save(&user).await?;
        Ok(user)
    }

    fn issue_session(&self, user: User) -> Result<Session, AppError> {
        Ok(Session {
            access_token: self.tokens.issue_access(&user.email)?,
            refresh_token: self.tokens.issue_refresh(&user.email)?,
            expires_in: self.tokens.access_ttl_seconds(),
            user,
        })
    }
}
