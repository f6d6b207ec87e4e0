//! HTTP transport used by the refresh gate.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{header, Client};
use tracing::debug;

use super::{ApiError, ApiRequest, ApiResponse};

/// Sends one request and reads the whole response.
///
/// Non-2xx statuses are returned as `Ok`; only failures to reach the server
/// are errors. The gate decides what a status means.
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, ApiError>>;
}

/// Transport backed by `reqwest`.
/// The cookie jar keeps the refresh cookie set by the login response.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent(concat!("quizkit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, ApiError>> {
        async move {
            let url = self.url(&request.path);
            let mut builder = self
                .client
                .request(request.method.clone(), &url)
                .headers(request.headers.clone())
                .header(header::ACCEPT, "application/json");
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;
            debug!(method = %request.method, url = %url, status = status.as_u16(), "Response received");

            Ok(ApiResponse { status, headers, body })
        }
        .boxed()
    }
}
