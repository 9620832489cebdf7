//! In-process scripted transport for unit tests
//!
//! [`ScriptedTransport`] answers `post_chat` calls from a queue of prepared
//! outcomes and records every request it receives, so exchange logic can be
//! driven without a network.

use super::transport::{ChatReply, ChatRequest, ChatTransport};
use crate::error::ExchangeError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Error returned once the script runs out
pub const SCRIPT_EXHAUSTED: &str = "no scripted reply left";

/// Transport that replays prepared outcomes
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ChatReply, ExchangeError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    /// Create a transport with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that waits `delay` before answering
    ///
    /// Pairs with paused tokio time to exercise the exchange timeout.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Queue a decoded 2xx reply
    pub fn push_reply(&self, reply: ChatReply) {
        self.push(Ok(reply));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: ExchangeError) {
        self.push(Err(error));
    }

    fn push(&self, outcome: Result<ChatReply, ExchangeError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of `post_chat` calls received
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| Err(ExchangeError::NetworkError(SCRIPT_EXHAUSTED.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            message: text.to_string(),
            timestamp: "2025-01-01 12:00:00".to_string(),
            username: "User".to_string(),
            regenerate: false,
            session_id: None,
        }
    }

    #[tokio::test]
    async fn test_replays_script_and_records_requests() {
        let transport = ScriptedTransport::new();
        transport.push_reply(ChatReply::text("Hi there"));

        let reply = transport.post_chat(&request("Hello")).await.unwrap();

        assert_eq!(reply.response.as_deref(), Some("Hi there"));
        assert_eq!(transport.requests()[0].message, "Hello");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_script_is_network_error() {
        let transport = ScriptedTransport::new();
        transport.push_error(ExchangeError::Timeout);

        assert_eq!(
            transport.post_chat(&request("a")).await,
            Err(ExchangeError::Timeout)
        );
        assert_eq!(
            transport.post_chat(&request("b")).await,
            Err(ExchangeError::NetworkError(SCRIPT_EXHAUSTED.to_string()))
        );
        assert_eq!(transport.call_count(), 2);
    }
}
