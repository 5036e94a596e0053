// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Users are stored keyed by normalized email, which makes the document id
//! itself the uniqueness constraint: a conditional insert on an existing
//! email fails atomically, no matter how many writers race.
//!
//! Revoked tokens are keyed by the SHA-256 of the raw token. Physical
//! purging of expired entries is left to a Firestore TTL policy on the
//! `expires_at` field; membership checks exclude expired entries anyway.

use crate::db::{collections, RevocationStore, UserDirectory};
use crate::error::AppError;
use crate::models::{RevokedToken, User};
use async_trait::async_trait;
use chrono::Utc;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl UserDirectory for FirestoreDb {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(email)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn create(&self, user: &User) -> Result<(), AppError> {
        // Conditional insert: fails if the document (email) already exists.
        let _: () = self
            .client
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.email)
            .object(user)
            .execute()
            .await
            .map_err(|e| match e {
                firestore::errors::FirestoreError::DataConflictError(_) => {
                    AppError::Conflict("Email already exists".to_string())
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.email)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for FirestoreDb {
    async fn insert(&self, entry: &RevokedToken) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::REVOKED_TOKENS)
            .document_id(RevokedToken::document_id(&entry.token))
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, AppError> {
        let entry: Option<RevokedToken> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::REVOKED_TOKENS)
            .obj()
            .one(&RevokedToken::document_id(token))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // An entry past its own expiry is not reported, even if the TTL
        // sweep has not removed it yet.
        Ok(entry.is_some_and(|e| e.expires_at > Utc::now()))
    }
}
