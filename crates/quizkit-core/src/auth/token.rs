use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Short-lived bearer credential. Held in memory only.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    obtained_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.obtained_at
    }

    /// Same credential, regardless of when each copy was obtained
    pub fn same_as(&self, other: &AccessToken) -> bool {
        self.token == other.token
    }
}

// Keep tokens out of logs and panic messages
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Body returned by the login, registration and refresh endpoints.
/// The Nest API answers `accessToken`, the Express API `access_token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
}
