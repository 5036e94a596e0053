//! Revocation-set entry for logged-out tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A denylisted token, stored until its natural expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    /// The raw token string.
    pub token: String,
    /// Subject email, kept for audit only.
    pub user_email: String,
    /// The token's own expiry. Entries past this instant are meaningless
    /// and are excluded from membership checks.
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Document id for a token: SHA-256 hex of the raw string, so ids stay
    /// short and free of characters the store rejects.
    pub fn document_id(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_stable_hex() {
        let a = RevokedToken::document_id("some.jwt.token");
        let b = RevokedToken::document_id("some.jwt.token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_document_id_differs_per_token() {
        assert_ne!(
            RevokedToken::document_id("token-a"),
            RevokedToken::document_id("token-b")
        );
    }
}
