//! REST API client module for the quiz platform.
//!
//! This module provides the `ApiClient` for communicating with the platform
//! API, and the pieces it is built from: replayable request descriptors, the
//! `Transport` seam and the list query helpers.
//!
//! The API uses short-lived bearer tokens renewed from a refresh cookie; see
//! `crate::auth::RefreshGate` for how renewal is serialized.

pub mod client;
pub mod error;
pub mod query;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use query::{LeaderboardPeriod, LeaderboardQuery, ListQuery, Page, SortOrder};
pub use request::{ApiRequest, ApiResponse};
pub use transport::{HttpTransport, Transport};
