//! Request/response cycle with the remote chat service
//!
//! [`MessageExchange`] drives one exchange on behalf of a chat:
//!
//! 1. `send` appends the user message to the [`ConversationStore`] before any
//!    network activity. That append is never rolled back.
//! 2. The request goes through the [`ChatTransport`] under a timeout. The
//!    [`RetryPolicy`] may repeat only this network step.
//! 3. A reply is appended (or, for `regenerate`, replaces the old reply in
//!    place). A failed `send` also appends a warning entry to the transcript,
//!    while a failed `regenerate` leaves the transcript untouched.
//!
//! Every outcome is reported as an [`ExchangeOutcome`]; failures carry the
//! user-facing notice.

#[cfg(test)]
pub mod fake;
pub mod http;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub use fake::ScriptedTransport;
pub use http::{HealthStatus, HttpChatClient};
pub use retry::RetryPolicy;
pub use transport::{ChatReply, ChatRequest, ChatTransport};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::conversation::{ConversationStore, Message, MessageId};
use crate::error::{ExchangeError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Prefix of the notice raised when `send` fails
pub const SEND_FAILURE_PREFIX: &str = "Failed to send message: ";

/// Prefix of the notice raised when `regenerate` fails
pub const REGENERATE_FAILURE_PREFIX: &str = "Failed to regenerate response: ";

/// Bound on a single network attempt unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one `send` or `regenerate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Preconditions not met; nothing was appended and no request was made
    Skipped,
    /// The reply that was appended, or that replaced the regenerated message
    Replied(Message),
    /// The service answered without a `response`; nothing further was appended
    NoReply,
    /// The exchange failed
    Failed {
        /// Classified failure
        error: ExchangeError,
        /// Human-readable notice for the error banner
        notice: String,
    },
}

impl ExchangeOutcome {
    /// The banner text for a failed exchange
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Failed { notice, .. } => Some(notice),
            _ => None,
        }
    }

    /// Whether a request was actually issued
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Driver of request/response cycles against a [`ChatTransport`]
pub struct MessageExchange {
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl MessageExchange {
    /// Create an exchange with the default timeout and no retry
    pub fn new(transport: Arc<dyn ChatTransport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::single(),
        }
    }

    /// Create an HTTP-backed exchange from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpChatClient::new(&config.endpoint)?;
        Ok(Self::new(Arc::new(transport), Arc::new(SystemClock))
            .with_timeout(config.endpoint.timeout())
            .with_retry(RetryPolicy::from_config(&config.retry)))
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The clock used for ids and timestamps
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Send `text` as a new user message on `chat_id`
    ///
    /// Blank text, or an unknown chat, is skipped without touching the store
    /// or the network.
    pub async fn send(
        &self,
        store: &mut ConversationStore,
        chat_id: &str,
        text: &str,
        username: &str,
    ) -> ExchangeOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ExchangeOutcome::Skipped;
        }
        if store.chat(chat_id).is_none() {
            tracing::debug!(chat_id = %chat_id, "Send ignored: unknown chat");
            return ExchangeOutcome::Skipped;
        }

        let user_message = Message::user(
            self.next_id(store, chat_id),
            text,
            self.clock.timestamp(),
        );
        store.append_message(chat_id, user_message);

        let request = self.request(chat_id, text, username, false);
        match self.dispatch(&request).await {
            Ok(Some(reply)) => {
                let message = Message::bot(
                    self.next_id(store, chat_id),
                    reply,
                    self.clock.timestamp(),
                );
                store.append_message(chat_id, message.clone());
                ExchangeOutcome::Replied(message)
            }
            Ok(None) => {
                tracing::debug!(chat_id = %chat_id, "Chat service returned no response text");
                ExchangeOutcome::NoReply
            }
            Err(error) => {
                let notice = format!("{}{}", SEND_FAILURE_PREFIX, error);
                tracing::error!(chat_id = %chat_id, "{}", notice);

                let entry = Message::error(
                    self.next_id(store, chat_id),
                    &notice,
                    self.clock.timestamp(),
                );
                store.append_message(chat_id, entry);
                ExchangeOutcome::Failed { error, notice }
            }
        }
    }

    /// Ask again for the reply `message_id` on `chat_id`
    ///
    /// The prompt is the nearest user message before `message_id`. Skipped
    /// when the message is missing, is itself a user message, or has no user
    /// message before it. On success the message is replaced in place and
    /// keeps its id; on failure the transcript is left as it was.
    pub async fn regenerate(
        &self,
        store: &mut ConversationStore,
        chat_id: &str,
        message_id: MessageId,
        username: &str,
    ) -> ExchangeOutcome {
        let Some(prompt) = store
            .chat(chat_id)
            .and_then(|chat| regenerate_prompt(&chat.messages, message_id))
        else {
            tracing::debug!(chat_id = %chat_id, message_id, "Regenerate ignored");
            return ExchangeOutcome::Skipped;
        };

        let request = self.request(chat_id, &prompt, username, true);
        match self.dispatch(&request).await {
            Ok(Some(reply)) => {
                let message = Message::bot(message_id, reply, self.clock.timestamp());
                store.replace_message(chat_id, message_id, message.clone());
                ExchangeOutcome::Replied(message)
            }
            Ok(None) => ExchangeOutcome::NoReply,
            Err(error) => {
                let notice = format!("{}{}", REGENERATE_FAILURE_PREFIX, error);
                tracing::error!(chat_id = %chat_id, message_id, "{}", notice);
                ExchangeOutcome::Failed { error, notice }
            }
        }
    }

    fn next_id(&self, store: &ConversationStore, chat_id: &str) -> MessageId {
        store.next_message_id(chat_id, self.clock.now_millis())
    }

    fn request(&self, chat_id: &str, text: &str, username: &str, regenerate: bool) -> ChatRequest {
        ChatRequest {
            message: text.to_string(),
            timestamp: self.clock.timestamp(),
            username: username.to_string(),
            regenerate,
            session_id: Some(chat_id.to_string()),
        }
    }

    async fn dispatch(
        &self,
        request: &ChatRequest,
    ) -> std::result::Result<Option<String>, ExchangeError> {
        let transport = self.transport.as_ref();
        let timeout = self.timeout;

        self.retry
            .run(move |attempt| async move {
                tracing::debug!(attempt, "Posting chat request");
                match tokio::time::timeout(timeout, transport.post_chat(request)).await {
                    Ok(reply) => reply?.into_outcome(),
                    Err(_) => Err(ExchangeError::Timeout),
                }
            })
            .await
    }
}

/// Text of the nearest user message before the bot message `message_id`
fn regenerate_prompt(messages: &[Message], message_id: MessageId) -> Option<String> {
    let index = messages.iter().position(|m| m.id == message_id)?;
    if messages[index].is_user {
        return None;
    }
    messages[..index]
        .iter()
        .rev()
        .find(|m| m.is_user)
        .map(|m| m.text.clone())
}
