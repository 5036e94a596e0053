// SPDX-License-Identifier: MIT

//! Auth-Service API Server
//!
//! Authenticates end users against local passwords and Google OAuth,
//! issues bearer session tokens, and maintains the revocation set.

use auth_service::{
    config::Config,
    db::FirestoreDb,
    services::{AuthService, GoogleOAuthClient, TokenService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Auth-Service API");

    // Initialize Firestore database (users + revoked tokens)
    let db = Arc::new(
        FirestoreDb::new(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore"),
    );

    let tokens = TokenService::new(&config);
    let google = Arc::new(GoogleOAuthClient::new(&config));
    tracing::info!("Google OAuth client initialized");

    let auth = AuthService::new(db.clone(), db, google, tokens);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        auth,
    });

    // Build router
    let app = auth_service::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auth_service=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
