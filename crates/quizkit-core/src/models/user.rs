use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Shortest password the API accepts
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Author,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn can_author(&self) -> bool {
        matches!(self.role, Role::Author | Role::Admin)
    }
}

/// Registration form
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ApiError> {
        let name_len = self.username.chars().count();
        if !(3..=30).contains(&name_len) {
            return Err(ApiError::Validation(
                "Username must be 3 to 30 characters".to_string(),
            ));
        }
        if !self.username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ApiError::Validation(
                "Username may only contain letters, digits and underscores".to_string(),
            ));
        }
        if !is_plausible_email(&self.email) {
            return Err(ApiError::Validation(format!("Not an email address: {}", self.email)));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Shape check only (`local@domain.tld`); the API does the real verification
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
