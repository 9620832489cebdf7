//! Data model for chats and messages
//!
//! Field names serialize in camelCase so the persisted `chats` entry keeps the
//! shape the browser client wrote (`isUser`, `isError`, `currentChatId`).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier of a message, unique and increasing within its chat
pub type MessageId = u64;

/// Id of the chat seeded when no valid state is stored
pub const DEFAULT_CHAT_ID: &str = "default";

/// Title of the seeded chat
pub const DEFAULT_CHAT_TITLE: &str = "ChatGenie";

/// Title given to chats created with `new_chat` until the first user message
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Marker prepended to error entries in the transcript
pub const WARNING_MARKER: &str = "⚠️";

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Creation-ordered id
    pub id: MessageId,
    /// Message body
    pub text: String,
    /// `true` for user-authored messages, `false` for bot replies and errors
    pub is_user: bool,
    /// Creation time in `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    /// Set on bot-authored entries that report a failed exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl Message {
    /// Create a user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::conversation::Message;
    ///
    /// let msg = Message::user(1, "Hello", "2025-01-01 12:00:00");
    /// assert!(msg.is_user);
    /// assert!(!msg.is_error());
    /// ```
    pub fn user(id: MessageId, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_user: true,
            timestamp: timestamp.into(),
            is_error: None,
        }
    }

    /// Create a bot reply
    pub fn bot(id: MessageId, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_user: false,
            timestamp: timestamp.into(),
            is_error: None,
        }
    }

    /// Create a bot-authored error entry
    ///
    /// The text is prefixed with [`WARNING_MARKER`].
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::conversation::Message;
    ///
    /// let text = "Failed to send message: Request timed out";
    /// let msg = Message::error(7, text, "2025-01-01 12:00:30");
    /// assert!(msg.is_error());
    /// assert_eq!(msg.text, "⚠️ Failed to send message: Request timed out");
    /// ```
    pub fn error(id: MessageId, error: &str, timestamp: impl Into<String>) -> Self {
        Self {
            id,
            text: format!("{} {}", WARNING_MARKER, error),
            is_user: false,
            timestamp: timestamp.into(),
            is_error: Some(true),
        }
    }

    /// Whether this entry reports a failed exchange
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

/// A saved conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique, immutable id
    pub id: String,
    /// Sidebar title
    pub title: String,
    /// Transcript in append order
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Chat {
    /// Create an empty chat
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// The chat seeded when nothing valid is stored
    pub fn seed() -> Self {
        Self::new(DEFAULT_CHAT_ID, DEFAULT_CHAT_TITLE)
    }

    /// Find a message by id
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Last entry in the transcript
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// All chats plus the active-chat pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    /// Chats in insertion order; never empty
    pub chats: Vec<Chat>,
    /// Id of the active chat; always names a member of `chats`
    pub current_chat_id: String,
}

impl ConversationState {
    /// State holding only the seeded chat
    pub fn seed() -> Self {
        let chat = Chat::seed();
        let current_chat_id = chat.id.clone();
        Self {
            chats: vec![chat],
            current_chat_id,
        }
    }

    /// Whether a chat with `id` exists
    pub fn contains(&self, id: &str) -> bool {
        self.chats.iter().any(|c| c.id == id)
    }

    /// Position of the chat with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.chats.iter().position(|c| c.id == id)
    }

    /// Check the structural invariants
    ///
    /// Returns a description of the first violation found.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.chats.is_empty() {
            return Err("no chats".to_string());
        }
        let mut seen = HashSet::new();
        for chat in &self.chats {
            if !seen.insert(chat.id.as_str()) {
                return Err(format!("duplicate chat id '{}'", chat.id));
            }
        }
        if !self.contains(&self.current_chat_id) {
            return Err(format!(
                "current chat '{}' does not exist",
                self.current_chat_id
            ));
        }
        Ok(())
    }
}

/// One row of a chat listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSummary {
    /// Chat id
    pub id: String,
    /// Chat title
    pub title: String,
    /// Number of transcript entries
    pub message_count: usize,
    /// Timestamp of the newest entry, if any
    pub last_activity: Option<String>,
    /// Whether this is the active chat
    pub active: bool,
}
