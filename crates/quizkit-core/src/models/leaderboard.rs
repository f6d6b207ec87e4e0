use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    #[serde(alias = "_id")]
    pub user_id: String,
    pub username: String,
    pub score: u64,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// One category line in the performance breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: String,
    pub answered: u32,
    pub correct: u32,
}

impl CategoryStat {
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.answered)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub games_played: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    #[serde(default)]
    pub average_answer_ms: Option<u64>,
    #[serde(default)]
    pub best_rank: Option<u32>,
    #[serde(default)]
    pub categories: Vec<CategoryStat>,
}

impl PerformanceSummary {
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct_answers, self.questions_answered)
    }

    /// Category with the best accuracy, ignoring ones with too few answers to judge
    pub fn strongest_category(&self, min_answered: u32) -> Option<&CategoryStat> {
        self.categories
            .iter()
            .filter(|c| c.answered >= min_answered)
            .max_by(|a, b| a.accuracy().total_cmp(&b.accuracy()))
    }
}

fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole)
    }
}
