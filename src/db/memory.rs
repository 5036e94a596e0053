//! In-memory store backend for tests and storeless local runs.
//!
//! Provides the same atomicity guarantees as the Firestore backend:
//! `create` is a single `DashMap` entry operation, so concurrent
//! registrations for one email see exactly one winner.

use crate::db::{RevocationStore, UserDirectory};
use crate::error::AppError;
use crate::models::{RevokedToken, User};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};

/// In-memory user directory and revocation set.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    revoked: DashMap<String, RevokedToken>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(email).map(|u| u.clone()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.contains_key(email))
    }

    async fn create(&self, user: &User) -> Result<(), AppError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict("Email already exists".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn save(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.email.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for MemoryStore {
    async fn insert(&self, entry: &RevokedToken) -> Result<(), AppError> {
        self.revoked
            .insert(RevokedToken::document_id(&entry.token), entry.clone());
        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, AppError> {
        let key = RevokedToken::document_id(token);
        if let Some(entry) = self.revoked.get(&key) {
            if entry.expires_at > Utc::now() {
                return Ok(true);
            }
        } else {
            return Ok(false);
        }
        // Lazy sweep of the expired entry.
        self.revoked.remove(&key);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_user(email: &str) -> User {
        User::new_local(email.to_string(), "digest".to_string(), None, None)
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create(&test_user("a@example.com")).await.unwrap();

        let err = store.create(&test_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.exists_by_email("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_revocation_not_reported() {
        let store = MemoryStore::new();
        let entry = RevokedToken {
            token: "stale".to_string(),
            user_email: "a@example.com".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
            revoked_at: Utc::now(),
        };
        store.insert(&entry).await.unwrap();

        assert!(!RevocationStore::contains(&store, "stale").await.unwrap());
        // Lazy sweep removed the entry
        assert!(store.revoked.is_empty());
    }

    #[tokio::test]
    async fn test_live_revocation_reported() {
        let store = MemoryStore::new();
        let entry = RevokedToken {
            token: "live".to_string(),
            user_email: "a@example.com".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
            revoked_at: Utc::now(),
        };
        store.insert(&entry).await.unwrap();

        assert!(RevocationStore::contains(&store, "live").await.unwrap());
        assert!(!RevocationStore::contains(&store, "other").await.unwrap());
    }
}
