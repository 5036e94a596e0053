// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod auth;
pub mod google;
pub mod password;
pub mod token;

pub use auth::{AuthService, Session};
pub use google::{GoogleOAuthClient, GoogleTokenResponse, GoogleUserInfo, OAuthExchange};
pub use token::{Claims, TokenService};
