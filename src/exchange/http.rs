//! HTTP transport for the chat service
//!
//! [`HttpChatClient`] speaks to `POST {base_url}/chat` and
//! `GET {base_url}/health` with `reqwest`, classifying every failure into an
//! [`ExchangeError`].

use super::transport::{ChatReply, ChatRequest, ChatTransport};
use crate::config::EndpointConfig;
use crate::error::{ChatGenieError, ExchangeError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Extra time the client-level timeout allows beyond the exchange timeout
///
/// The exchange enforces the real bound; this only stops a stuck connection
/// from outliving the process's interest in it.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Service status, `"healthy"` when up
    pub status: String,
    /// Service version, if reported
    #[serde(default)]
    pub version: Option<String>,
    /// Server time, if reported
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `reqwest`-backed [`ChatTransport`]
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    base_url: String,
}

impl HttpChatClient {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::config::EndpointConfig;
    /// use chatgenie::exchange::HttpChatClient;
    ///
    /// let client = HttpChatClient::new(&EndpointConfig::default()).unwrap();
    /// assert_eq!(client.endpoint("/chat"), "http://localhost:5000/chat");
    /// ```
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout() + CLIENT_TIMEOUT_SLACK)
            .user_agent(concat!("chatgenie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ChatGenieError::Http)?;

        tracing::debug!("Initialized chat client: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for `path`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probe the service's health endpoint
    ///
    /// # Errors
    ///
    /// Returns the classified [`ExchangeError`] when the service is
    /// unreachable, answers non-2xx, or returns an undecodable body
    pub async fn health(&self) -> std::result::Result<HealthStatus, ExchangeError> {
        let url = self.endpoint("/health");
        tracing::debug!("Checking health at {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_send_error)?;

        decode(check_status(response).await?).await
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn post_chat(
        &self,
        request: &ChatRequest,
    ) -> std::result::Result<ChatReply, ExchangeError> {
        let url = self.endpoint("/chat");

        tracing::debug!(
            "Sending chat request: chars={}, regenerate={}",
            request.message.chars().count(),
            request.regenerate
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        decode(check_status(response).await?).await
    }
}

fn classify_send_error(e: reqwest::Error) -> ExchangeError {
    if e.is_timeout() {
        tracing::error!("Chat request timed out: {}", e);
        ExchangeError::Timeout
    } else {
        tracing::error!("Chat request failed: {}", e);
        ExchangeError::NetworkError(e.to_string())
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, ExchangeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    tracing::error!("Chat service returned error {}: {}", status, error_text);
    Err(ExchangeError::ServerError {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
    })
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, ExchangeError> {
    response.json::<T>().await.map_err(|e| {
        tracing::error!("Failed to parse chat service response: {}", e);
        ExchangeError::NetworkError(format!("Invalid response body: {}", e))
    })
}
