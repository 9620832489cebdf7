//! Chat session facade
//!
//! [`ChatSession`] is what a front end talks to. It exposes a read-only view
//! of the active chat, the loading flag and the current error banner, and
//! accepts the user commands (send, regenerate, chat management).
//!
//! Only one exchange runs at a time: while the loading flag is set, `send`
//! and `regenerate` return [`ExchangeOutcome::Skipped`].

use crate::config::Config;
use crate::conversation::{Chat, ConversationStore, Message, MessageId};
use crate::error::Result;
use crate::exchange::{ExchangeOutcome, MessageExchange};
use crate::storage::KeyValueStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clears the loading flag when an exchange ends, however it ends
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A user's chat session
pub struct ChatSession {
    store: ConversationStore,
    exchange: MessageExchange,
    username: String,
    loading: Arc<AtomicBool>,
    error: Option<String>,
}

impl ChatSession {
    /// Create a session over an already loaded store
    pub fn new(
        store: ConversationStore,
        exchange: MessageExchange,
        username: impl Into<String>,
    ) -> Self {
        Self {
            store,
            exchange,
            username: username.into(),
            loading: Arc::new(AtomicBool::new(false)),
            error: None,
        }
    }

    /// Load the store from `storage` and connect to the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &Config, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = ConversationStore::load(storage);
        let exchange = MessageExchange::from_config(config)?;
        Ok(Self::new(store, exchange, config.user.username.clone()))
    }

    /// Underlying store
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// All chats in insertion order
    pub fn chats(&self) -> &[Chat] {
        self.store.chats()
    }

    /// The active chat
    pub fn current_chat(&self) -> &Chat {
        self.store.current_chat()
    }

    /// Transcript of the active chat
    pub fn current_messages(&self) -> &[Message] {
        &self.store.current_chat().messages
    }

    /// Username sent with requests
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether an exchange is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Shared handle to the loading flag, for observers such as a spinner
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        self.loading.clone()
    }

    /// Current error banner, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clear the error banner
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Send `text` on the active chat
    pub async fn send(&mut self, text: &str) -> ExchangeOutcome {
        if text.trim().is_empty() {
            return ExchangeOutcome::Skipped;
        }
        let Some(_guard) = LoadingGuard::engage(&self.loading) else {
            tracing::debug!("Send ignored: exchange already in flight");
            return ExchangeOutcome::Skipped;
        };

        self.error = None;
        let chat_id = self.store.current_chat_id().to_string();
        let outcome = self
            .exchange
            .send(&mut self.store, &chat_id, text, &self.username)
            .await;

        self.record(&outcome);
        outcome
    }

    /// Regenerate the reply `message_id` on the active chat
    pub async fn regenerate(&mut self, message_id: MessageId) -> ExchangeOutcome {
        let Some(_guard) = LoadingGuard::engage(&self.loading) else {
            tracing::debug!("Regenerate ignored: exchange already in flight");
            return ExchangeOutcome::Skipped;
        };

        let chat_id = self.store.current_chat_id().to_string();
        let outcome = self
            .exchange
            .regenerate(&mut self.store, &chat_id, message_id, &self.username)
            .await;

        if outcome.was_attempted() {
            self.error = None;
        }
        self.record(&outcome);
        outcome
    }

    /// Regenerate the newest bot-authored entry of the active chat
    pub async fn regenerate_last(&mut self) -> ExchangeOutcome {
        let last_reply = self
            .current_messages()
            .iter()
            .rev()
            .find(|m| !m.is_user)
            .map(|m| m.id);

        match last_reply {
            Some(id) => self.regenerate(id).await,
            None => ExchangeOutcome::Skipped,
        }
    }

    /// Create and activate an empty chat
    pub fn new_chat(&mut self) -> String {
        self.store.new_chat()
    }

    /// Delete a chat
    pub fn delete_chat(&mut self, id: &str) {
        self.store.delete_chat(id);
    }

    /// Activate a chat; returns `false` if it does not exist
    pub fn select_chat(&mut self, id: &str) -> bool {
        self.store.select_chat(id)
    }

    /// Rename a chat; returns `false` if nothing changed
    pub fn rename_chat(&mut self, id: &str, title: &str) -> bool {
        self.store.rename_chat(id, title)
    }

    fn record(&mut self, outcome: &ExchangeOutcome) {
        if let Some(notice) = outcome.notice() {
            self.error = Some(notice.to_string());
        }
    }
}
