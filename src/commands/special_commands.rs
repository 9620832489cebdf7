//! Slash commands for the interactive chat session
//!
//! Anything typed at the chat prompt that starts with `/` is parsed here
//! instead of being sent as a message. Command names are case-insensitive;
//! arguments (chat ids, titles) keep their case.

use crate::conversation::MessageId;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands that act on the session rather than being sent as a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new chat and switch to it
    NewChat,

    /// List saved chats
    ListChats,

    /// Switch to the chat with this id or id prefix
    SelectChat(String),

    /// Delete the chat with this id or id prefix
    DeleteChat(String),

    /// Rename the active chat
    RenameChat(String),

    /// Regenerate a reply; `None` means the newest one
    Regenerate(Option<MessageId>),

    /// Reprint the active chat's transcript
    ShowTranscript,

    /// Clear the error banner
    DismissError,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input as a message
    None,
}

/// Parse a line of chat input
///
/// Returns `SpecialCommand::None` for ordinary text. Bare `exit` and `quit`
/// also end the session.
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and missing or malformed
/// arguments
///
/// # Examples
///
/// ```
/// use chatgenie::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new"), Ok(SpecialCommand::NewChat));
/// assert_eq!(parse_special_command("/regen 42"), Ok(SpecialCommand::Regenerate(Some(42))));
/// assert_eq!(parse_special_command("hello"), Ok(SpecialCommand::None));
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(SpecialCommand::Exit),
            _ => Ok(SpecialCommand::None),
        };
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewChat),
        "/list" | "/chats" => Ok(SpecialCommand::ListChats),
        "/show" | "/history" => Ok(SpecialCommand::ShowTranscript),
        "/dismiss" | "/clear" => Ok(SpecialCommand::DismissError),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/quit" | "/exit" | "/q" => Ok(SpecialCommand::Exit),

        "/select" => required(&name, arg, "/select <chat-id>").map(SpecialCommand::SelectChat),
        "/delete" => required(&name, arg, "/delete <chat-id>").map(SpecialCommand::DeleteChat),
        "/rename" => required(&name, arg, "/rename <title>").map(SpecialCommand::RenameChat),

        "/regen" | "/regenerate" => {
            if arg.is_empty() {
                return Ok(SpecialCommand::Regenerate(None));
            }
            arg.parse::<MessageId>()
                .map(|id| SpecialCommand::Regenerate(Some(id)))
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: name.clone(),
                    arg: arg.to_string(),
                })
        }

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn required(command: &str, arg: &str, usage: &str) -> Result<String, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(arg.to_string())
    }
}

/// Print the slash command reference
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

CHATS:
  /new              - Start a new chat and switch to it
  /list             - List saved chats (active chat marked with *)
  /select <id>      - Switch to a chat (a unique id prefix is enough)
  /delete <id>      - Delete a chat
  /rename <title>   - Rename the active chat

MESSAGES:
  /show             - Reprint the active chat's transcript
  /regen [id]       - Ask again for a reply (defaults to the newest reply)
  /dismiss          - Clear the error banner

SESSION:
  /help             - Show this help
  /quit, exit       - Leave the session

Anything else is sent to the chat service as a message.
"#
    );
}
