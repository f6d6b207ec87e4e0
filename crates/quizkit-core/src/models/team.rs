use serde::{Deserialize, Serialize};

use crate::api::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(rename = "userId", alias = "_id")]
    pub user_id: String,
    pub username: String,
    #[serde(rename = "isCaptain", default)]
    pub is_captain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(rename = "memberCount", default)]
    pub member_count: Option<u32>,
    #[serde(rename = "totalScore", default)]
    pub total_score: u64,
}

impl Team {
    /// Member count from the API, or from the member list when it is omitted
    pub fn size(&self) -> u32 {
        self.member_count
            .unwrap_or_else(|| u32::try_from(self.members.len()).unwrap_or(u32::MAX))
    }

    pub fn captain(&self) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.is_captain)
    }

    pub fn display_member_count(&self) -> String {
        match self.size() {
            1 => "1 member".to_string(),
            n => format!("{} members", n),
        }
    }
}

pub fn validate_team_name(name: &str) -> Result<(), ApiError> {
    let len = name.trim().chars().count();
    if !(2..=50).contains(&len) {
        return Err(ApiError::Validation(
            "Team name must be 2 to 50 characters".to_string(),
        ));
    }
    Ok(())
}
