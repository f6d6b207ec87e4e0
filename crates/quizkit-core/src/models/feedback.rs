use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Bug,
    Suggestion,
    /// Report about a quiz or a question (wrong answer, offensive content)
    ContentReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub kind: FeedbackKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
}

impl NewFeedback {
    pub fn validate(&self) -> Result<(), ApiError> {
        let len = self.message.trim().chars().count();
        if len == 0 {
            return Err(ApiError::Validation("Feedback message is required".to_string()));
        }
        if len > MAX_MESSAGE_LEN {
            return Err(ApiError::Validation(format!(
                "Feedback message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }
        if self.kind == FeedbackKind::ContentReport && self.quiz_id.is_none() && self.question_id.is_none() {
            return Err(ApiError::Validation(
                "A content report must name a quiz or a question".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InReview,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackTicket {
    #[serde(alias = "_id")]
    pub id: String,
    pub kind: FeedbackKind,
    pub status: TicketStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(kind: FeedbackKind, message: &str) -> NewFeedback {
        NewFeedback {
            kind,
            message: message.to_string(),
            quiz_id: None,
            question_id: None,
        }
    }

    #[test]
    fn test_validate_feedback() {
        assert!(feedback(FeedbackKind::Suggestion, "Add a music category").validate().is_ok());
        assert!(feedback(FeedbackKind::Bug, "  ").validate().is_err());
        assert!(feedback(FeedbackKind::Bug, &"x".repeat(2001)).validate().is_err());

        let mut report = feedback(FeedbackKind::ContentReport, "Answer 2 is wrong");
        assert!(report.validate().is_err());
        report.question_id = Some("qq7".to_string());
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_feedback_wire_format() {
        let json = serde_json::to_value(feedback(FeedbackKind::ContentReport, "typo")).unwrap();
        assert_eq!(json["kind"], "content_report");
        assert!(json.get("quizId").is_none());
    }
}
