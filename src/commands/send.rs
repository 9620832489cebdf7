//! One-shot send handler

use super::print_message;
use crate::config::Config;
use crate::error::{ChatGenieError, Result};
use crate::exchange::ExchangeOutcome;
use crate::session::ChatSession;
use crate::storage::KeyValueStore;
use colored::Colorize;
use std::sync::Arc;

/// Send `text` on the active chat (or a new one) and print the reply
///
/// The exchange is recorded in the chat store exactly as in the interactive
/// session, including the warning entry on failure.
///
/// # Errors
///
/// Returns `ChatGenieError::Exchange` when the exchange fails, so the process
/// exits non-zero
pub async fn run_send(
    config: Config,
    storage: Arc<dyn KeyValueStore>,
    text: String,
    new_chat: bool,
) -> Result<()> {
    let mut session = ChatSession::from_config(&config, storage)?;
    if new_chat {
        session.new_chat();
    }

    match session.send(&text).await {
        ExchangeOutcome::Replied(message) => {
            print_message(&message, session.username());
            Ok(())
        }
        ExchangeOutcome::NoReply => {
            println!("{}", "No reply received.".yellow());
            Ok(())
        }
        ExchangeOutcome::Skipped => {
            Err(ChatGenieError::InvalidInput("message text cannot be empty".to_string()).into())
        }
        ExchangeOutcome::Failed { error, notice } => {
            eprintln!("{}", notice.red().bold());
            Err(ChatGenieError::Exchange(error).into())
        }
    }
}
