//! API client for the quiz platform REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests for quizzes, teams, games, leaderboards, analytics and feedback.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::query::{LeaderboardQuery, ListQuery, Page};
use super::{ApiError, ApiRequest, HttpTransport, Transport};
use crate::auth::{AccessToken, RefreshGate, Session, SessionData, SessionTeardown};
use crate::config::ClientConfig;
use crate::models::{
    normalize_join_code, validate_team_name, AnswerResult, AnswerSubmission, FeedbackTicket,
    GameSession, LeaderboardEntry, NewAccount, NewFeedback, NewQuiz, PerformanceSummary, Quiz,
    QuizSummary, Team, User,
};

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const LOGOUT_PATH: &str = "/auth/logout";
const ME_PATH: &str = "/users/me";

/// Body of the login and registration responses
#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
    user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartGame<'a> {
    quiz_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Clears the in-memory session, then hands over to the application
struct ExpireSession {
    session: Arc<Session>,
    hook: Option<Arc<dyn SessionTeardown>>,
}

impl SessionTeardown for ExpireSession {
    fn on_session_expired(&self) {
        self.session.on_session_expired();
        if let Some(ref hook) = self.hook {
            hook.on_session_expired();
        }
    }
}

/// API client for the quiz platform.
/// Clone is cheap - clones share the refresh gate, session and connection pool.
#[derive(Clone)]
pub struct ApiClient {
    gate: Arc<RefreshGate>,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client talking HTTP to `config.base_url`
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_teardown(config, None)
    }

    /// Like `new`, with a hook run when the session expires (failed refresh)
    pub fn with_teardown(
        config: &ClientConfig,
        hook: Option<Arc<dyn SessionTeardown>>,
    ) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let transport = HttpTransport::new(&config.base_url, timeout)?;
        Ok(Self::from_transport(Arc::new(transport), &config.refresh_path, hook))
    }

    /// Build on any transport (tests, alternative HTTP stacks)
    pub fn from_transport(
        transport: Arc<dyn Transport>,
        refresh_path: &str,
        hook: Option<Arc<dyn SessionTeardown>>,
    ) -> Self {
        let session = Arc::new(Session::new());
        let teardown = Arc::new(ExpireSession {
            session: Arc::clone(&session),
            hook,
        });
        let refresh = ApiRequest::new(Method::POST, refresh_path);
        let gate = Arc::new(RefreshGate::new(transport, refresh, teardown));
        Self { gate, session }
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    pub fn session(&self) -> Option<SessionData> {
        self.session.data()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active() && self.gate.credential().is_some()
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.gate.request(request).await?;
        response.json()
    }

    /// For endpoints that answer 204 or a body we do not need
    async fn send_discarding(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.gate.request(request).await?;
        Ok(())
    }

    fn start_session(&self, auth: AuthResponse) -> User {
        self.gate.set_credential(AccessToken::new(auth.access_token));
        self.session.update(SessionData::new(auth.user.clone()));
        auth.user
    }

    // ===== Authentication =====

    /// Create an account and log in as it
    pub async fn register(&self, account: &NewAccount) -> Result<User, ApiError> {
        account.validate()?;
        let request = ApiRequest::post(REGISTER_PATH).with_json(account)?.public();
        let auth: AuthResponse = self.send(request).await?;
        info!(user = %auth.user.username, "Registered");
        Ok(self.start_session(auth))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .with_json(&Credentials { email, password })?
            .public();
        let auth: AuthResponse = self.send(request).await?;
        info!(user = %auth.user.username, "Logged in");
        Ok(self.start_session(auth))
    }

    /// Restore a session from the refresh cookie alone (no password)
    pub async fn restore_session(&self) -> Result<User, ApiError> {
        self.gate.refresh().await?;
        let user = self.current_user().await?;
        self.session.update(SessionData::new(user.clone()));
        debug!(user = %user.username, "Session restored");
        Ok(user)
    }

    /// Log out on the server, then locally. Local state is cleared even if the
    /// server call fails.
    pub async fn logout(&self) {
        if self.gate.credential().is_some() {
            // An expired token is not worth renewing just to log out
            let request = ApiRequest::post(LOGOUT_PATH).without_renewal();
            if let Err(e) = self.send_discarding(request).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }
        self.gate.clear_credential();
        self.session.clear();
        info!("Logged out");
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.send(ApiRequest::get(ME_PATH)).await
    }

    // ===== Quizzes =====

    pub async fn list_quizzes(&self, query: &ListQuery) -> Result<Page<QuizSummary>, ApiError> {
        self.send(ApiRequest::get("/quizzes").with_query(query.to_pairs())).await
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> Result<Quiz, ApiError> {
        self.send(ApiRequest::get(format!("/quizzes/{}", quiz_id))).await
    }

    pub async fn create_quiz(&self, quiz: &NewQuiz) -> Result<Quiz, ApiError> {
        quiz.validate()?;
        let created: Quiz = self.send(ApiRequest::post("/quizzes").with_json(quiz)?).await?;
        info!(quiz = %created.id, questions = created.questions.len(), "Quiz created");
        Ok(created)
    }

    pub async fn delete_quiz(&self, quiz_id: &str) -> Result<(), ApiError> {
        self.send_discarding(ApiRequest::delete(format!("/quizzes/{}", quiz_id))).await
    }

    // ===== Teams =====

    pub async fn list_teams(&self, query: &ListQuery) -> Result<Page<Team>, ApiError> {
        self.send(ApiRequest::get("/teams").with_query(query.to_pairs())).await
    }

    pub async fn create_team(&self, name: &str) -> Result<Team, ApiError> {
        validate_team_name(name)?;
        let body = serde_json::json!({ "name": name.trim() });
        self.send(ApiRequest::post("/teams").with_json(&body)?).await
    }

    pub async fn join_team(&self, team_id: &str) -> Result<Team, ApiError> {
        self.send(ApiRequest::post(format!("/teams/{}/members", team_id))).await
    }

    pub async fn leave_team(&self, team_id: &str) -> Result<(), ApiError> {
        self.send_discarding(ApiRequest::delete(format!("/teams/{}/members/me", team_id))).await
    }

    // ===== Game sessions =====

    /// Open a lobby for `quiz_id`, optionally playing as a team
    pub async fn start_game(&self, quiz_id: &str, team_id: Option<&str>) -> Result<GameSession, ApiError> {
        let body = StartGame { quiz_id, team_id };
        self.send(ApiRequest::post("/sessions").with_json(&body)?).await
    }

    pub async fn join_game(&self, code: &str) -> Result<GameSession, ApiError> {
        let code = normalize_join_code(code);
        if code.is_empty() {
            return Err(ApiError::Validation("Join code is required".to_string()));
        }
        self.send(ApiRequest::post(format!("/sessions/{}/join", code))).await
    }

    pub async fn submit_answer(
        &self,
        game_id: &str,
        answer: &AnswerSubmission,
    ) -> Result<AnswerResult, ApiError> {
        let path = format!("/sessions/{}/answers", game_id);
        self.send(ApiRequest::post(path).with_json(answer)?).await
    }

    // ===== Leaderboards & analytics =====

    pub async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Page<LeaderboardEntry>, ApiError> {
        self.send(ApiRequest::get("/leaderboard").with_query(query.to_pairs())).await
    }

    pub async fn my_performance(&self) -> Result<PerformanceSummary, ApiError> {
        self.send(ApiRequest::get("/analytics/me")).await
    }

    // ===== Feedback =====

    pub async fn submit_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackTicket, ApiError> {
        feedback.validate()?;
        self.send(ApiRequest::post("/feedback").with_json(feedback)?).await
    }
}
