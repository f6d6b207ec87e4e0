use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::User;

/// Called once when the session ends involuntarily (the refresh failed).
/// Applications use it to drop user state and send the user back to login.
pub trait SessionTeardown: Send + Sync {
    fn on_session_expired(&self);
}

impl<F> SessionTeardown for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_expired(&self) {
        self()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user: User,
    pub logged_in_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(user: User) -> Self {
        Self {
            user,
            logged_in_at: Utc::now(),
        }
    }

    pub fn duration(&self) -> Duration {
        Utc::now() - self.logged_in_at
    }

    /// Minutes since login (for display)
    pub fn minutes_logged_in(&self) -> i64 {
        self.duration().num_minutes().max(0)
    }
}

/// Who is logged in. Memory only: the access token lives in the refresh
/// gate, the refresh cookie in the transport.
#[derive(Default)]
pub struct Session {
    data: RwLock<Option<SessionData>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update session with new data
    pub fn update(&self, data: SessionData) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Some(data);
    }

    /// Clear session data
    pub fn clear(&self) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn data(&self) -> Option<SessionData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn user(&self) -> Option<User> {
        self.data().map(|d| d.user)
    }

    pub fn is_active(&self) -> bool {
        self.data.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl SessionTeardown for Session {
    fn on_session_expired(&self) {
        if let Some(data) = self.data() {
            info!(user = %data.user.username, "Session expired, clearing user state");
        }
        self.clear();
    }
}
