//! Conversation state manager
//!
//! [`ConversationStore`] is the single source of truth for chats and the
//! active selection. Every mutation is written through to the injected
//! [`KeyValueStore`] immediately. Write failures are logged and swallowed:
//! the in-memory state stays authoritative for the session.
//!
//! Operations that name an unknown chat id leave the state untouched.

use super::title::derive_title;
use super::types::{Chat, ChatSummary, ConversationState, Message, MessageId, NEW_CHAT_TITLE};
use crate::error::Result;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use ulid::Ulid;

/// Storage key holding the serialized chats array
pub const CHATS_KEY: &str = "chats";

/// Storage key holding the active chat id
pub const CURRENT_CHAT_KEY: &str = "currentChatId";

/// Generate a new chat id
///
/// ULIDs sort by creation time, which keeps ids readable in listings.
///
/// # Examples
///
/// ```
/// use chatgenie::conversation::new_chat_id;
///
/// let id = new_chat_id();
/// assert_eq!(id.len(), 26);
/// ```
pub fn new_chat_id() -> String {
    Ulid::new().to_string()
}

/// Owner of the chat collection and active-chat pointer
pub struct ConversationStore {
    state: ConversationState,
    storage: Arc<dyn KeyValueStore>,
}

impl ConversationStore {
    /// Load state from `storage`, seeding a default chat when nothing valid is stored
    ///
    /// Never fails: unreadable or malformed entries are logged and replaced by
    /// the seed. A stale active-chat pointer falls back to the most recently
    /// created chat.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::conversation::ConversationStore;
    /// use chatgenie::storage::MemoryStore;
    /// use std::sync::Arc;
    ///
    /// let store = ConversationStore::load(Arc::new(MemoryStore::new()));
    /// assert_eq!(store.chats().len(), 1);
    /// assert_eq!(store.current_chat_id(), "default");
    /// ```
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = match read_state(storage.as_ref()) {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::debug!("No stored chats, seeding default chat");
                ConversationState::seed()
            }
            Err(e) => {
                tracing::warn!("Stored chat state is unusable, seeding default chat: {}", e);
                ConversationState::seed()
            }
        };

        tracing::debug!(
            chats = state.chats.len(),
            current = %state.current_chat_id,
            "Loaded conversation state"
        );

        Self { state, storage }
    }

    /// Full state snapshot
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Chats in insertion order
    pub fn chats(&self) -> &[Chat] {
        &self.state.chats
    }

    /// Id of the active chat
    pub fn current_chat_id(&self) -> &str {
        &self.state.current_chat_id
    }

    /// The active chat
    pub fn current_chat(&self) -> &Chat {
        self.chat(&self.state.current_chat_id)
            .unwrap_or(&self.state.chats[0])
    }

    /// Look up a chat by id
    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.state.chats.iter().find(|c| c.id == id)
    }

    /// Listing rows for every chat, in insertion order
    pub fn summaries(&self) -> Vec<ChatSummary> {
        self.state
            .chats
            .iter()
            .map(|chat| ChatSummary {
                id: chat.id.clone(),
                title: chat.title.clone(),
                message_count: chat.messages.len(),
                last_activity: chat.last_message().map(|m| m.timestamp.clone()),
                active: chat.id == self.state.current_chat_id,
            })
            .collect()
    }

    /// Resolve a full chat id from an exact id or a unique prefix
    ///
    /// Returns `None` when nothing matches or the prefix is ambiguous.
    pub fn resolve_chat_id(&self, id_or_prefix: &str) -> Option<String> {
        if self.state.contains(id_or_prefix) {
            return Some(id_or_prefix.to_string());
        }
        let mut matches = self
            .state
            .chats
            .iter()
            .filter(|c| c.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(chat), None) if !id_or_prefix.is_empty() => Some(chat.id.clone()),
            _ => None,
        }
    }

    /// Next message id for `chat_id` given the current clock reading
    ///
    /// Ids follow the clock in epoch milliseconds but always exceed the
    /// chat's newest id, so two messages created in the same millisecond stay
    /// distinct and ordered.
    pub fn next_message_id(&self, chat_id: &str, now_millis: u64) -> MessageId {
        let floor = self
            .chat(chat_id)
            .and_then(|c| c.messages.iter().map(|m| m.id).max())
            .map(|max| max.saturating_add(1))
            .unwrap_or(0);
        now_millis.max(floor)
    }

    /// Create an empty chat, append it and make it active
    ///
    /// Returns the new chat's id.
    pub fn new_chat(&mut self) -> String {
        let mut id = new_chat_id();
        while self.state.contains(&id) {
            id = new_chat_id();
        }

        self.state.chats.push(Chat::new(id.clone(), NEW_CHAT_TITLE));
        self.state.current_chat_id = id.clone();
        tracing::debug!(chat_id = %id, "Created chat");

        self.persist();
        id
    }

    /// Delete a chat
    ///
    /// Deleting the only chat behaves exactly like [`Self::new_chat`]. When the
    /// active chat is removed, the chat that preceded it becomes active, or
    /// the first chat if it was first.
    pub fn delete_chat(&mut self, id: &str) {
        let Some(index) = self.state.position(id) else {
            tracing::debug!(chat_id = %id, "Delete ignored: unknown chat");
            return;
        };

        if self.state.chats.len() == 1 {
            tracing::debug!(chat_id = %id, "Deleting the only chat starts a new one");
            self.new_chat();
            return;
        }

        self.state.chats.remove(index);
        if self.state.current_chat_id == id {
            let next = index.saturating_sub(1);
            self.state.current_chat_id = self.state.chats[next].id.clone();
        }
        tracing::debug!(chat_id = %id, current = %self.state.current_chat_id, "Deleted chat");

        self.persist();
    }

    /// Make `id` the active chat
    ///
    /// Returns `false`, leaving the selection unchanged, if no such chat exists.
    pub fn select_chat(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            tracing::debug!(chat_id = %id, "Select ignored: unknown chat");
            return false;
        }
        self.state.current_chat_id = id.to_string();
        self.persist();
        true
    }

    /// Set a chat's title explicitly
    ///
    /// Blank titles are ignored. Returns whether the title changed.
    pub fn rename_chat(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(chat) = self.chat_mut(id) else {
            return false;
        };
        chat.title = title.to_string();
        self.persist();
        true
    }

    /// Append a message to a chat
    ///
    /// A user message that is the chat's first message also sets the title.
    /// Returns `false` if the chat does not exist.
    pub fn append_message(&mut self, chat_id: &str, message: Message) -> bool {
        let Some(chat) = self.chat_mut(chat_id) else {
            tracing::debug!(chat_id = %chat_id, "Append ignored: unknown chat");
            return false;
        };

        if chat.messages.is_empty() && message.is_user {
            chat.title = derive_title(&message.text);
        }
        chat.messages.push(message);

        self.persist();
        true
    }

    /// Replace a message in place, keeping its position and id
    ///
    /// Returns `false` if the chat or message does not exist.
    pub fn replace_message(
        &mut self,
        chat_id: &str,
        message_id: MessageId,
        new_message: Message,
    ) -> bool {
        let Some(chat) = self.chat_mut(chat_id) else {
            return false;
        };
        let Some(slot) = chat.messages.iter_mut().find(|m| m.id == message_id) else {
            tracing::debug!(chat_id = %chat_id, message_id, "Replace ignored: unknown message");
            return false;
        };

        *slot = Message {
            id: message_id,
            ..new_message
        };

        self.persist();
        true
    }

    /// Write the current state to storage
    ///
    /// Failures are logged and otherwise ignored.
    pub fn persist(&self) {
        if let Err(e) = write_state(self.storage.as_ref(), &self.state) {
            tracing::warn!("Failed to persist chat state: {}", e);
        }
    }

    fn chat_mut(&mut self, id: &str) -> Option<&mut Chat> {
        self.state.chats.iter_mut().find(|c| c.id == id)
    }
}

/// Read persisted state
///
/// `Ok(None)` means nothing is stored yet; `Err` means something is stored
/// but unusable.
fn read_state(storage: &dyn KeyValueStore) -> Result<Option<ConversationState>> {
    let Some(raw_chats) = storage.get(CHATS_KEY)? else {
        return Ok(None);
    };

    let chats: Vec<Chat> = serde_json::from_str(&raw_chats)?;
    let stored_current = storage.get(CURRENT_CHAT_KEY).unwrap_or_else(|e| {
        tracing::warn!("Failed to read active chat id: {}", e);
        None
    });

    let current_chat_id = match stored_current {
        Some(id) if chats.iter().any(|c| c.id == id) => id,
        _ => chats.last().map(|c| c.id.clone()).unwrap_or_default(),
    };

    let state = ConversationState {
        chats,
        current_chat_id,
    };
    state.check().map_err(|e| anyhow::anyhow!(e))?;

    Ok(Some(state))
}

fn write_state(storage: &dyn KeyValueStore, state: &ConversationState) -> Result<()> {
    let chats_json = serde_json::to_string(&state.chats)?;
    storage.set(CHATS_KEY, &chats_json)?;
    storage.set(CURRENT_CHAT_KEY, &state.current_chat_id)?;
    Ok(())
}
