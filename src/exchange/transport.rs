//! Wire types and the transport seam for the chat endpoint

use crate::error::ExchangeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fallback reason when the server reports an error without text
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// User text being answered
    pub message: String,
    /// Client-side timestamp of the request
    pub timestamp: String,
    /// Display name of the sender
    pub username: String,
    /// Set when asking for a fresh answer to an earlier message
    #[serde(default, skip_serializing_if = "is_false")]
    pub regenerate: bool,
    /// Chat id, used by the server to key its per-chat history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Decoded body of a 2xx `POST /chat` answer
///
/// Every field is optional on the wire; extra fields such as `timestamp` are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// `"error"` marks an application-level failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Error text accompanying `status: "error"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    /// Successful reply carrying `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            ..Self::default()
        }
    }

    /// Application error reply carrying `error`
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: Some("error".to_string()),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Interpret the body
    ///
    /// `status: "error"` becomes [`ExchangeError::ApplicationError`]. A missing
    /// or blank `response` yields `Ok(None)`; otherwise the trimmed text.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::exchange::ChatReply;
    ///
    /// assert_eq!(
    ///     ChatReply::text("  Hi there \n").into_outcome(),
    ///     Ok(Some("Hi there".to_string()))
    /// );
    /// assert!(ChatReply::error("quota exceeded").into_outcome().is_err());
    /// ```
    pub fn into_outcome(self) -> Result<Option<String>, ExchangeError> {
        if self.status.as_deref() == Some("error") {
            let reason = self
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string());
            return Err(ExchangeError::ApplicationError(reason));
        }

        Ok(self
            .response
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()))
    }
}

/// Carrier of a single chat request
///
/// Implementations perform one network attempt and classify its failure.
/// Timeouts and retries are applied by the caller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and return the decoded 2xx body
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError>;
}
