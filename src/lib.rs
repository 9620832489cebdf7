//! ChatGenie - conversation state manager and chat client library
//!
//! This library keeps a persistent collection of chats, drives message
//! exchanges with a local chat service, and exposes a session facade for
//! front ends such as the bundled CLI.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conversation`: Chats, messages, title derivation and the `ConversationStore`
//! - `exchange`: Request/response cycle, transport seam, HTTP client and retry
//! - `session`: `ChatSession`, the view/command facade with single-flight
//! - `storage`: Key-value persistence port (in-memory and `sled` backends)
//! - `clock`: Injected time source for ids and timestamps
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use chatgenie::{ChatSession, Config};
//! use chatgenie::storage::SledStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let storage = Arc::new(SledStore::open_default()?);
//!     let mut session = ChatSession::from_config(&config, storage)?;
//!     session.send("Hello").await;
//!     for message in session.current_messages() {
//!         println!("{}", message.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod exchange;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use conversation::{Chat, ConversationState, ConversationStore, Message};
pub use error::{ChatGenieError, ExchangeError, Result};
pub use exchange::{ExchangeOutcome, MessageExchange};
pub use session::ChatSession;

#[cfg(test)]
pub mod test_utils;
