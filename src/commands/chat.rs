//! Interactive chat session handler
//!
//! Runs a readline loop over a [`ChatSession`]. Lines starting with `/` are
//! session commands; everything else is sent as a message on the active chat.

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{chat_table, print_message, print_transcript, BOT_NAME};
use crate::config::Config;
use crate::error::Result;
use crate::exchange::ExchangeOutcome;
use crate::session::ChatSession;
use crate::storage::KeyValueStore;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

/// Start the interactive chat session
///
/// # Errors
///
/// Returns error if the HTTP client or the line editor cannot be created
pub async fn run_chat(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<()> {
    let mut session = ChatSession::from_config(&config, storage)?;
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(&config);
    print_transcript(session.current_chat(), session.username());

    loop {
        let prompt = format!("{}> ", session.username()).cyan().bold().to_string();
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e.to_string().yellow());
                        continue;
                    }
                };

                match command {
                    SpecialCommand::Exit => break,
                    SpecialCommand::None => {
                        let outcome = session.send(trimmed).await;
                        report_outcome(&session, &outcome);
                    }
                    other => handle_special_command(&mut session, other).await,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn handle_special_command(session: &mut ChatSession, command: SpecialCommand) {
    match command {
        SpecialCommand::NewChat => {
            let id = session.new_chat();
            println!("{}\n", format!("Started new chat {}", id).green());
        }
        SpecialCommand::ListChats => {
            chat_table(&session.store().summaries()).printstd();
            println!();
        }
        SpecialCommand::SelectChat(id) => match session.store().resolve_chat_id(&id) {
            Some(full_id) => {
                session.select_chat(&full_id);
                print_transcript(session.current_chat(), session.username());
            }
            None => eprintln!("{}\n", format!("No chat matches '{}'", id).yellow()),
        },
        SpecialCommand::DeleteChat(id) => match session.store().resolve_chat_id(&id) {
            Some(full_id) => {
                session.delete_chat(&full_id);
                println!("{}", format!("Deleted chat {}", full_id).green());
                print_transcript(session.current_chat(), session.username());
            }
            None => eprintln!("{}\n", format!("No chat matches '{}'", id).yellow()),
        },
        SpecialCommand::RenameChat(title) => {
            let id = session.current_chat().id.clone();
            if session.rename_chat(&id, &title) {
                println!("{}\n", format!("Renamed chat to '{}'", title).green());
            }
        }
        SpecialCommand::Regenerate(message_id) => {
            let outcome = match message_id {
                Some(id) => session.regenerate(id).await,
                None => session.regenerate_last().await,
            };
            if outcome == ExchangeOutcome::Skipped {
                eprintln!("{}\n", "Nothing to regenerate.".yellow());
            }
            report_outcome(session, &outcome);
        }
        SpecialCommand::ShowTranscript => {
            print_transcript(session.current_chat(), session.username());
        }
        SpecialCommand::DismissError => session.dismiss_error(),
        SpecialCommand::Help => print_help(),
        SpecialCommand::Exit | SpecialCommand::None => {}
    }
}

fn report_outcome(session: &ChatSession, outcome: &ExchangeOutcome) {
    match outcome {
        ExchangeOutcome::Replied(message) => {
            println!();
            print_message(message, session.username());
        }
        ExchangeOutcome::NoReply => {
            println!("{}\n", format!("{} returned no reply.", BOT_NAME).yellow());
        }
        ExchangeOutcome::Failed { .. } => {
            if let Some(error) = session.error() {
                eprintln!("\n{}\n", error.red().bold());
            }
        }
        ExchangeOutcome::Skipped => {}
    }
}

fn print_welcome_banner(config: &Config) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                 ChatGenie Interactive Chat                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Endpoint: {}", config.endpoint.base_url.cyan());
    println!("Type '/help' for available commands, 'exit' to quit\n");
}
