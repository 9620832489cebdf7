//! Chats, messages and the store that owns them

pub mod store;
pub mod title;
pub mod types;

pub use store::{new_chat_id, ConversationStore, CHATS_KEY, CURRENT_CHAT_KEY};
pub use title::{derive_title, TITLE_ELLIPSIS, TITLE_MAX_CHARS};
pub use types::{
    Chat, ChatSummary, ConversationState, Message, MessageId, DEFAULT_CHAT_ID,
    DEFAULT_CHAT_TITLE, NEW_CHAT_TITLE, WARNING_MARKER,
};
