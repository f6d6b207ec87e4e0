//! Request and response descriptors passed between the client, the refresh
//! gate and the transport.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ApiError;
use crate::auth::AccessToken;

/// A replayable description of one API call.
///
/// Unlike `reqwest::Request` this is `Clone`, so the refresh gate can send
/// the same call a second time with a renewed credential.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/quizzes/42`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    retried: bool,
    public: bool,
    renewable: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
            public: false,
            renewable: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Validation(format!("Failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Mark as an anonymous call (login, registration). Public calls are sent
    /// without a credential and a 401 is returned to the caller as-is.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Mark as already replayed once after a refresh
    pub fn retried(mut self) -> Self {
        self.retried = true;
        self
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Send with the current credential, but hand a 401 back to the caller
    /// instead of renewing the token (e.g. logout)
    pub fn without_renewal(mut self) -> Self {
        self.renewable = false;
        self
    }

    pub fn is_renewable(&self) -> bool {
        self.renewable
    }

    /// Set (or replace) the bearer credential header
    pub(crate) fn authorize(&mut self, token: &AccessToken) -> Result<(), ApiError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| ApiError::InvalidResponse("Access token is not a valid header value".to_string()))?;
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(())
    }

    pub(crate) fn strip_authorization(&mut self) {
        self.headers.remove(header::AUTHORIZATION);
    }
}

/// A fully-read HTTP response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-2xx response into the matching `ApiError`
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON body: {}", e)))
    }
}
