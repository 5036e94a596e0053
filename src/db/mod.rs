//! Database layer: storage traits plus Firestore and in-memory backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{RevokedToken, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const REVOKED_TOKENS: &str = "revoked_tokens";
}

/// Durable mapping from email to a user record.
///
/// Email uniqueness is enforced here, at the storage boundary: `create`
/// must be atomic so that two concurrent registrations for the same email
/// cannot both succeed, even if both passed an existence pre-check.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Whether a user with this normalized email exists.
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Insert a new user. Fails with `AppError::Conflict` if a user with
    /// the same email already exists.
    async fn create(&self, user: &User) -> Result<(), AppError>;

    /// Update an existing user, keyed by email.
    async fn save(&self, user: &User) -> Result<(), AppError>;
}

/// Append-only set of tokens considered invalid before natural expiry.
///
/// Once `insert` returns, all subsequent `contains` calls observe the
/// entry. Entries whose `expires_at` has passed are never reported.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn insert(&self, entry: &RevokedToken) -> Result<(), AppError>;

    async fn contains(&self, token: &str) -> Result<bool, AppError>;
}
