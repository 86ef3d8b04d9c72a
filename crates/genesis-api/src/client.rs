//! HTTP client for the chat backend

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    types::{ChatRequest, HealthStatus, RunState},
};

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8002";
/// Timeout for a full `/chat` turn
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for a `/health` probe
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// The two backend calls the client depends on
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base URL, for messages that tell the user where the backend is expected
    fn base_url(&self) -> &str;

    /// `GET /health`; any non-2xx is an error
    async fn health(&self) -> Result<HealthStatus>;

    /// `POST /chat`; returns the complete turn
    async fn chat(&self, request: &ChatRequest) -> Result<RunState>;
}

/// reqwest-backed [`Backend`]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    chat_timeout: Duration,
    health_timeout: Duration,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            chat_timeout: CHAT_TIMEOUT,
            health_timeout: HEALTH_TIMEOUT,
        }
    }

    /// Override the chat timeout
    pub fn with_chat_timeout(mut self, timeout: Duration) -> Self {
        self.chat_timeout = timeout;
        self
    }

    /// Override the health timeout
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Turn a non-success response into [`Error::Status`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::status(status.as_u16(), body))
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(self.url("/health"))
            .timeout(self.health_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;

        // The payload is informational; a 2xx with an odd body is still healthy.
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<RunState> {
        tracing::debug!("POST {} ({} chars)", self.url("/chat"), request.message.len());

        let response = self
            .client
            .post(self.url("/chat"))
            .timeout(self.chat_timeout)
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let text = response.text().await?;
        let run: RunState = serde_json::from_str(&text)?;
        tracing::debug!(
            "chat response: request_id={:?}, results={}",
            run.request_id,
            run.results().len()
        );
        Ok(run)
    }
}
