//! History command handlers: list and delete stored conversations

use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{AtelierError, Result};
use crate::store::{ConversationStore, SnapshotState, SnapshotStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands against the persisted snapshot
pub fn handle_history(command: HistoryCommand, config: &Config) -> Result<()> {
    let snapshot = match &config.storage.snapshot_path {
        Some(path) => SnapshotStore::new(path)?,
        None => SnapshotStore::open_default()?,
    };
    let state = snapshot.load();

    match command {
        HistoryCommand::List => {
            if state.conversations.is_empty() {
                println!("{}", "No stored conversations.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Artifacts".bold(),
                "Branched From".bold(),
                "Created".bold()
            ]);

            for conversation in &state.conversations {
                let id_short = &conversation.id[..conversation.id.len().min(8)];
                let title = if conversation.title.chars().count() > 40 {
                    let clipped: String = conversation.title.chars().take(37).collect();
                    format!("{}...", clipped)
                } else {
                    conversation.title.clone()
                };
                let branched = conversation
                    .branched_from
                    .as_deref()
                    .map(|id| id[..id.len().min(8)].to_string())
                    .unwrap_or_else(|| "-".to_string());

                table.add_row(prettytable::row![
                    id_short.cyan(),
                    title,
                    conversation.messages.len(),
                    conversation.artifacts.len(),
                    branched,
                    conversation.created_at
                ]);
            }

            println!("\nStored Conversations:");
            table.printstd();
            println!();
            println!(
                "Use {} to continue a conversation.",
                "atelier chat".cyan()
            );
            println!();
        }
        HistoryCommand::Delete { id } => {
            let mut store = ConversationStore::from_parts(
                state.conversations,
                state.active_conversation_id,
            );

            let full_id = store
                .conversations()
                .iter()
                .find(|c| c.id == id || c.id.starts_with(&id))
                .map(|c| c.id.clone())
                .ok_or_else(|| AtelierError::NotFound(format!("conversation {}", id)))?;

            store.delete_conversation(&full_id)?;

            let new_state = SnapshotState {
                conversations: store.conversations().to_vec(),
                active_conversation_id: store.active_id().map(String::from),
                language: state.language,
            };
            snapshot.save(&new_state)?;
            println!("{}", format!("Deleted conversation {}", full_id).green());
        }
    }

    Ok(())
}
