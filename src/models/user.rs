//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse entitlement level gating feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountTier {
    Standard,
    Vip,
}

/// Which credential source the user registered with. A Google user may
/// still hold a password digest after account linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthProvider {
    Local,
    Google,
}

/// Durable user record, keyed in the store by normalized email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque stable identifier, assigned at creation, immutable.
    pub id: String,
    /// Normalized email address (unique across all users).
    pub email: String,
    /// Argon2 PHC digest. Present iff the user can authenticate locally.
    pub password_digest: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Authentication gate. Disabled users cannot log in or refresh.
    pub enabled: bool,
    pub account_tier: AccountTier,
    pub auth_provider: AuthProvider,
    /// Google's stable subject identifier, set on first Google login.
    pub provider_id: Option<String>,
    /// Last profile picture URL observed from the provider.
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a locally-registered user with defaults applied.
    pub fn new_local(
        email: String,
        password_digest: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_digest: Some(password_digest),
            first_name,
            last_name,
            enabled: true,
            account_tier: AccountTier::Standard,
            auth_provider: AuthProvider::Local,
            provider_id: None,
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a password digest is set (local registration or linked account).
    pub fn has_password(&self) -> bool {
        self.password_digest
            .as_deref()
            .is_some_and(|d| !d.is_empty())
    }
}

/// Normalize an email for comparison and storage: trim and ASCII-lowercase.
///
/// Two addresses differing only in case resolve to the same identity.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
