/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`    — Interactive chat session
- `send`    — One-shot message on the active chat
- `history` — Saved chat management
- `health`  — Endpoint liveness probe

Shared helpers for opening the chat store and printing chats live here.
*/

use crate::config::Config;
use crate::conversation::{Chat, ChatSummary, Message};
use crate::error::Result;
use crate::storage::{KeyValueStore, MemoryStore, SledStore};
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

pub mod chat;
pub mod health;
pub mod history;
pub mod send;
pub mod special_commands;

/// Display name for bot-authored entries
pub const BOT_NAME: &str = "ChatGenie";

/// Number of id characters shown in listings
pub const SHORT_ID_LEN: usize = 8;

/// Open the chat store selected by configuration
///
/// `ephemeral` keeps everything in memory for the lifetime of the process.
///
/// # Errors
///
/// Returns error if the on-disk store cannot be opened
pub fn open_storage(config: &Config, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        tracing::debug!("Using in-memory chat store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = match &config.storage.path {
        Some(path) => SledStore::open(path)?,
        None => SledStore::open_default()?,
    };
    tracing::info!("Using chat store at {}", store.path().display());
    Ok(Arc::new(store))
}

/// First [`SHORT_ID_LEN`] characters of an id
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Author label for a transcript entry
pub fn author_label<'a>(message: &Message, username: &'a str) -> &'a str {
    if message.is_user {
        username
    } else {
        BOT_NAME
    }
}

/// Print one transcript entry
pub fn print_message(message: &Message, username: &str) {
    let header = format!(
        "{} {}",
        author_label(message, username),
        message.timestamp.dimmed()
    );
    let header = if message.is_user {
        header.cyan().bold()
    } else if message.is_error() {
        header.red().bold()
    } else {
        header.green().bold()
    };

    println!("{} {}", header, format!("#{}", message.id).dimmed());
    if message.is_error() {
        println!("{}\n", message.text.red());
    } else {
        println!("{}\n", message.text);
    }
}

/// Print a chat's title and full transcript
pub fn print_transcript(chat: &Chat, username: &str) {
    println!("\n{} {}", chat.title.bold(), format!("({})", chat.id).dimmed());
    println!("{}", "-".repeat(60).dimmed());

    if chat.messages.is_empty() {
        println!("{}\n", "No messages yet.".yellow());
        return;
    }

    for message in &chat.messages {
        print_message(message, username);
    }
}

/// Build the listing table for saved chats
pub fn chat_table(summaries: &[ChatSummary]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "",
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Activity".bold()
    ]);

    for summary in summaries {
        let marker = if summary.active { "*" } else { "" };
        let last = summary.last_activity.as_deref().unwrap_or("-");
        table.add_row(prettytable::row![
            marker.green(),
            short_id(&summary.id).cyan(),
            summary.title,
            summary.message_count,
            last
        ]);
    }

    table
}
