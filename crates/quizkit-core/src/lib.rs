//! Quizkit core - authenticated client for the quiz platform API.
//!
//! The interesting part is [`auth::RefreshGate`]: concurrent calls that hit an
//! expired access token share a single refresh and are replayed once with the
//! new token. [`api::ApiClient`] puts the platform's endpoints on top of it.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AccessToken, RefreshGate, SessionTeardown};
pub use config::{ClientConfig, Config};
