// SPDX-License-Identifier: MIT

//! Auth-Service: identity and session management
//!
//! This crate provides a stateless authentication API: local password and
//! Google OAuth login reconciled into one user record, signed session
//! tokens, and a revocation set that makes logout effective.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::AuthService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
}
