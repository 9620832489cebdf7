//! Command-line interface definition for ChatGenie
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot sends, history
//! management and endpoint health checks.

use clap::{Parser, Subcommand};

/// ChatGenie - terminal client for a local chat service
///
/// Keeps a persistent list of conversations and exchanges messages
/// with a `POST /chat` endpoint.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatgenie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Keep chats in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Override the chat store location
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    /// Override the username sent with requests
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ChatGenie
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session on the active chat
    Chat,

    /// Send a single message on the active chat and print the reply
    Send {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Start a new chat before sending
        #[arg(short, long)]
        new: bool,
    },

    /// Manage saved chats
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Check that the chat service is reachable
    Health,
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved chats
    List,

    /// Show a chat transcript (defaults to the active chat)
    Show {
        /// Chat id or unique id prefix
        #[arg(short, long)]
        id: Option<String>,
    },

    /// Make a chat the active one
    Select {
        /// Chat id or unique id prefix
        id: String,
    },

    /// Delete a chat
    Delete {
        /// Chat id or unique id prefix
        id: String,
    },

    /// Create an empty chat and make it active
    New,

    /// Rename a chat
    Rename {
        /// Chat id or unique id prefix
        id: String,

        /// New title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            ephemeral: false,
            store_path: None,
            username: None,
            command: Commands::History {
                command: HistoryCommand::List,
            },
        }
    }
}
