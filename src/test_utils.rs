//! Test utilities for ChatGenie
//!
//! This module provides common test utilities: temporary store locations,
//! sessions wired to a scripted transport and a frozen clock, and assertion
//! helpers.

use crate::clock::ManualClock;
use crate::conversation::ConversationStore;
use crate::error::Result;
use crate::exchange::{MessageExchange, ScriptedTransport};
use crate::session::ChatSession;
use crate::storage::MemoryStore;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for a sled store
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Build a session over an empty in-memory store
///
/// The exchange uses `transport`, the default 30 second timeout, no retry,
/// and a clock frozen at `2025-01-01 12:00:00`.
pub fn scripted_session(transport: Arc<ScriptedTransport>) -> ChatSession {
    let store = ConversationStore::load(Arc::new(MemoryStore::new()));
    let exchange = MessageExchange::new(transport, Arc::new(ManualClock::at_default()));
    ChatSession::new(store, exchange, "User")
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatGenieError;

    #[test]
    fn test_temp_dir_exists() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_scripted_session_starts_on_seed_chat() {
        let session = scripted_session(Arc::new(ScriptedTransport::new()));
        assert_eq!(session.chats().len(), 1);
        assert_eq!(session.username(), "User");
        assert!(!session.is_loading());
    }

    #[test]
    fn test_assert_error_contains() {
        let result: Result<()> = Err(ChatGenieError::Config("bad timeout".to_string()).into());
        assert_error_contains(result, "bad timeout");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_panics_on_ok() {
        assert_error_contains(Ok(1), "anything");
    }
}
