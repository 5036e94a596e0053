// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod token;
pub mod user;

pub use token::RevokedToken;
pub use user::{normalize_email, AccountTier, AuthProvider, User};
