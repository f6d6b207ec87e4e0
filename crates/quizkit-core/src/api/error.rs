use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// The token refresh failed; the session is over and the user must log in again.
    /// Every caller that was waiting on the same refresh shares the same cause.
    #[error("Session expired: {0}")]
    SessionExpired(#[source] Arc<ApiError>),

    #[error("Token refresh was abandoned before it settled")]
    RefreshAbandoned,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 422 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            409 => ApiError::Conflict(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the caller has to authenticate again before retrying.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_) | ApiError::RefreshAbandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty"),
            ApiError::BadRequest(ref msg) if msg == "title must not be empty"
        ));
        assert!(matches!(ApiError::from_status(StatusCode::CONFLICT, "taken"), ApiError::Conflict(_)));
        assert!(matches!(ApiError::from_status(StatusCode::BAD_GATEWAY, "down"), ApiError::ServerError(_)));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "tea"),
            ApiError::InvalidResponse(ref msg) if msg.starts_with("Status 418")
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total bytes)"));

        // Never split a multi-byte character
        let accented = "é".repeat(MAX_ERROR_BODY_LENGTH);
        assert!(ApiError::truncate_body(&accented).contains("truncated"));
    }

    #[test]
    fn test_session_expired_keeps_cause() {
        let cause = Arc::new(ApiError::AccessDenied("refresh cookie revoked".to_string()));
        let err = ApiError::SessionExpired(cause);
        assert!(err.is_session_expired());
        assert_eq!(err.to_string(), "Session expired: Access denied: refresh cookie revoked");
        assert!(!ApiError::Unauthorized.is_session_expired());
    }
}
