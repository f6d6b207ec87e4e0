//! Data models for the quiz platform API.
//!
//! This module contains the request and response types for:
//!
//! - `User`, `NewAccount`: accounts and registration
//! - `Quiz`, `QuizSummary`, `Question`, `NewQuiz`: quiz authoring and browsing
//! - `Team`: team management
//! - `GameSession`, `AnswerSubmission`, `AnswerResult`: game sessions
//! - `LeaderboardEntry`, `PerformanceSummary`: leaderboards and analytics
//! - `NewFeedback`, `FeedbackTicket`: feedback and content reports
//!
//! Forms carry a `validate()` that catches what the API would reject before
//! the request is sent.

pub mod feedback;
pub mod game;
pub mod leaderboard;
pub mod quiz;
pub mod team;
pub mod user;

pub use feedback::{FeedbackKind, FeedbackTicket, NewFeedback, TicketStatus};
pub use game::{normalize_join_code, AnswerResult, AnswerSubmission, GameSession, GameStatus};
pub use leaderboard::{CategoryStat, LeaderboardEntry, PerformanceSummary};
pub use quiz::{Difficulty, NewQuiz, Question, Quiz, QuizSummary};
pub use team::{validate_team_name, Team, TeamMember};
pub use user::{is_plausible_email, NewAccount, Role, User};
