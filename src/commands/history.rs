use super::{chat_table, print_transcript, short_id};
use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::conversation::ConversationStore;
use crate::error::{ChatGenieError, Result};
use crate::storage::KeyValueStore;
use colored::Colorize;
use std::sync::Arc;

/// Handle history commands
pub fn handle_history(
    command: HistoryCommand,
    config: &Config,
    storage: Arc<dyn KeyValueStore>,
) -> Result<()> {
    let mut store = ConversationStore::load(storage);

    match command {
        HistoryCommand::List => {
            let summaries = store.summaries();

            println!("\nSaved Chats:");
            chat_table(&summaries).printstd();
            println!();
            println!(
                "Use {} to switch chats.",
                "chatgenie history select <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let id = match id {
                Some(id) => resolve(&store, &id)?,
                None => store.current_chat_id().to_string(),
            };
            if let Some(chat) = store.chat(&id) {
                print_transcript(chat, &config.user.username);
            }
        }
        HistoryCommand::Select { id } => {
            let id = resolve(&store, &id)?;
            store.select_chat(&id);
            println!("{}", format!("Active chat is now {}", short_id(&id)).green());
        }
        HistoryCommand::Delete { id } => {
            let id = resolve(&store, &id)?;
            let was_only = store.chats().len() == 1;
            store.delete_chat(&id);
            println!("{}", deletion_notice(&store, &id, was_only).green());
            println!(
                "Active chat: {} ({})",
                store.current_chat().title,
                short_id(store.current_chat_id()).cyan()
            );
        }
        HistoryCommand::New => {
            let id = store.new_chat();
            println!("{}", format!("Started new chat {}", id).green());
        }
        HistoryCommand::Rename { id, title } => {
            let id = resolve(&store, &id)?;
            let title = title.join(" ");
            if !store.rename_chat(&id, &title) {
                return Err(
                    ChatGenieError::InvalidInput("title cannot be empty".to_string()).into(),
                );
            }
            let notice = format!("Renamed chat {} to '{}'", short_id(&id), title.trim());
            println!("{}", notice.green());
        }
    }

    Ok(())
}

fn resolve(store: &ConversationStore, id: &str) -> Result<String> {
    store.resolve_chat_id(id).ok_or_else(|| {
        ChatGenieError::InvalidInput(format!(
            "no chat matches '{}' (or the prefix is ambiguous)",
            id
        ))
        .into()
    })
}

/// Confirmation for `history delete`
///
/// The only chat is never removed; deleting it keeps it and starts a fresh
/// chat instead.
fn deletion_notice(store: &ConversationStore, id: &str, was_only: bool) -> String {
    if was_only {
        format!(
            "Chat {} is the only chat, so it was kept; started new chat {}",
            short_id(id),
            short_id(store.current_chat_id())
        )
    } else {
        format!("Deleted chat {}", short_id(id))
    }
}
