use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

const MAX_TITLE_LEN: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Row in the quiz list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub play_count: u64,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    /// Hidden from players while a game is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_time_limit() -> u32 {
    30
}

fn default_points() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// Authoring form for a new quiz
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuiz {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub difficulty: Difficulty,
    pub is_public: bool,
    pub questions: Vec<Question>,
}

impl NewQuiz {
    pub fn validate(&self) -> Result<(), ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("Quiz title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ApiError::Validation(format!(
                "Quiz title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        if self.questions.is_empty() {
            return Err(ApiError::Validation("A quiz needs at least one question".to_string()));
        }
        for (i, question) in self.questions.iter().enumerate() {
            let number = i + 1;
            if question.text.trim().is_empty() {
                return Err(ApiError::Validation(format!("Question {} has no text", number)));
            }
            if question.options.len() < 2 {
                return Err(ApiError::Validation(format!(
                    "Question {} needs at least two options",
                    number
                )));
            }
            match question.correct_index {
                Some(idx) if idx < question.options.len() => {}
                _ => {
                    return Err(ApiError::Validation(format!(
                        "Question {} has no valid correct answer",
                        number
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], correct: Option<usize>) -> Question {
        Question {
            id: None,
            text: "Capital of France?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index: correct,
            time_limit_secs: 20,
            points: 100,
        }
    }

    fn quiz(questions: Vec<Question>) -> NewQuiz {
        NewQuiz {
            title: "Capitals".to_string(),
            description: None,
            category: Some("Geography".to_string()),
            difficulty: Difficulty::Easy,
            is_public: true,
            questions,
        }
    }

    #[test]
    fn test_validate_new_quiz() {
        assert!(quiz(vec![question(&["Paris", "Lyon"], Some(0))]).validate().is_ok());
        assert!(quiz(vec![]).validate().is_err());
        assert!(quiz(vec![question(&["Paris"], Some(0))]).validate().is_err());
        assert!(quiz(vec![question(&["Paris", "Lyon"], Some(2))]).validate().is_err());
        assert!(quiz(vec![question(&["Paris", "Lyon"], None)]).validate().is_err());

        let mut untitled = quiz(vec![question(&["Paris", "Lyon"], Some(0))]);
        untitled.title = "   ".to_string();
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn test_new_quiz_wire_format() {
        let json = serde_json::to_value(quiz(vec![question(&["Paris", "Lyon"], Some(0))])).unwrap();
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["questions"][0]["correctIndex"], 0);
        assert_eq!(json["questions"][0]["timeLimitSecs"], 20);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_parse_quiz() {
        let json = r#"{"_id":"q1","title":"Capitals","difficulty":"hard","questions":[{"text":"Capital of Peru?","options":["Lima","Cusco"]}]}"#;
        let quiz: Quiz = serde_json::from_str(json).unwrap();
        assert_eq!(quiz.difficulty, Difficulty::Hard);
        assert_eq!(quiz.questions[0].time_limit_secs, 30);
        assert!(quiz.questions[0].correct_index.is_none());
        assert_eq!(quiz.total_points(), 100);
    }
}
