use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

/// A live game of one quiz. Real-time updates go over the socket transport;
/// this is the REST view of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    #[serde(alias = "_id")]
    pub id: String,
    /// Join code players type in
    pub code: String,
    pub quiz_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    pub status: GameStatus,
    #[serde(default)]
    pub current_question: Option<u32>,
    #[serde(default)]
    pub player_count: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn is_joinable(&self) -> bool {
        self.status == GameStatus::Waiting
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: String,
    pub selected_index: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub correct: bool,
    #[serde(default)]
    pub points_awarded: u32,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub correct_index: Option<usize>,
}

/// Normalize a join code the way players type it: trimmed, upper case
pub fn normalize_join_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
