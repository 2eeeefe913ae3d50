//! Interactive chat mode handler
//!
//! Instantiates the generation provider, restores the persisted snapshot,
//! and runs a readline-based loop that submits user input through the chat
//! session. The snapshot is saved after every state change; a failed save
//! is logged and dropped, never fatal.

use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::localization::translate;
use crate::providers::{create_generator, InputMode};
use crate::session::ChatSession;
use crate::store::{Conversation, Message, Role, SnapshotStore};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::str::FromStr;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `language` - Optional override for the snapshot's interface language
/// * `mode` - Optional override for the initial input mode
pub async fn run_chat(
    config: Config,
    language: Option<String>,
    mode: Option<String>,
) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    let snapshot = open_snapshot(&config)?;
    let generator = create_generator(&config.provider)?;

    let mut session = ChatSession::new(generator, config.chat.language);
    session.restore(snapshot.load());

    if let Some(language) = language.as_deref() {
        match crate::localization::Language::from_str(language) {
            Ok(parsed) => session.set_language(parsed),
            Err(e) => tracing::warn!("Ignoring language override: {}", e),
        }
    }

    let mut input_mode = mode
        .as_deref()
        .and_then(|m| InputMode::parse_str(m).ok())
        .unwrap_or(InputMode::Chat);

    print_welcome_banner(&session, input_mode);

    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!(
            "[{}|{}] ❯ ",
            input_mode.to_string().cyan(),
            session.language()
        );
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_special_command(trimmed) {
                    SpecialCommand::New => {
                        session.new_conversation();
                        save_snapshot(&snapshot, &session);
                        println!(
                            "{}",
                            translate("sidebar.newConversation", session.language()).green()
                        );
                    }
                    SpecialCommand::Branch {
                        message_id,
                        new_content,
                    } => {
                        let resolved = resolve_message_id(&session, &message_id);
                        match session.edit_and_branch(&resolved, &new_content).await {
                            Ok(Some(reply)) => {
                                save_snapshot(&snapshot, &session);
                                print_reply(&reply, session.store().active_conversation());
                            }
                            Ok(None) => {
                                println!("{}", format!("No message {} to edit", message_id).yellow());
                            }
                            Err(e) => println!("{}", format!("Branch failed: {}", e).red()),
                        }
                    }
                    SpecialCommand::SwitchMode(new_mode) => {
                        input_mode = new_mode;
                        println!("Switched to {} mode", new_mode);
                    }
                    SpecialCommand::SwitchLanguage(new_language) => {
                        session.set_language(new_language);
                        save_snapshot(&snapshot, &session);
                        println!("Switched language to {}", new_language);
                    }
                    SpecialCommand::Messages => print_messages(session.store().active_conversation()),
                    SpecialCommand::Artifacts => {
                        print_artifacts(session.store().active_conversation())
                    }
                    SpecialCommand::Conversations => print_conversations(&session),
                    SpecialCommand::Open(id) => {
                        let resolved = resolve_conversation_id(&session, &id);
                        match session.select_conversation(&resolved) {
                            Ok(()) => {
                                save_snapshot(&snapshot, &session);
                                if let Some(conversation) = session.store().active_conversation() {
                                    println!("Switched to {}", conversation.title.bold());
                                }
                            }
                            Err(e) => println!("{}", e.to_string().red()),
                        }
                    }
                    SpecialCommand::Help => print_help(),
                    SpecialCommand::Exit => break,
                    SpecialCommand::Unknown(usage) => println!("{}", usage.yellow()),
                    SpecialCommand::None => {
                        match session.send(trimmed, Vec::new(), input_mode).await {
                            Ok(Some(reply)) => {
                                save_snapshot(&snapshot, &session);
                                print_reply(&reply, session.store().active_conversation());
                            }
                            Ok(None) => {}
                            Err(e) => println!("{}", format!("Send failed: {}", e).red()),
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("(interrupted; /exit to quit)");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        }
    }

    save_snapshot(&snapshot, &session);
    println!("Bye.");
    Ok(())
}

fn open_snapshot(config: &Config) -> Result<SnapshotStore> {
    match &config.storage.snapshot_path {
        Some(path) => SnapshotStore::new(path),
        None => SnapshotStore::open_default(),
    }
}

/// Persist the session; failures are logged and dropped.
fn save_snapshot(snapshot: &SnapshotStore, session: &ChatSession) {
    if let Err(e) = snapshot.save(&session.snapshot_state()) {
        tracing::warn!("Snapshot save failed: {}", e);
    }
}

fn print_welcome_banner(session: &ChatSession, mode: InputMode) {
    println!();
    println!("{}", "Atelier".bold().cyan());
    println!(
        "mode: {}  language: {}  conversations: {}",
        mode,
        session.language(),
        session.store().conversations().len()
    );
    println!("Type {} for commands.", "/help".cyan());
    println!();
}

fn print_reply(message: &Message, conversation: Option<&Conversation>) {
    println!();
    println!("{}", message.content);

    if let Some(sources) = &message.sources {
        for source in sources {
            match &source.title {
                Some(title) => println!("  {} {} <{}>", "source:".dimmed(), title, source.uri),
                None => println!("  {} {}", "source:".dimmed(), source.uri),
            }
        }
    }

    if let Some(artifact_id) = &message.artifact_id {
        if let Some(artifact) = conversation.and_then(|c| c.artifact(artifact_id)) {
            let label = artifact.label.as_deref().unwrap_or("(unlabeled)");
            println!(
                "  {} [{}] {} ({})",
                "artifact:".dimmed(),
                artifact.artifact_type.to_string().cyan(),
                label,
                short_id(&artifact.id)
            );
        }
    }
    println!();
}

fn print_messages(conversation: Option<&Conversation>) {
    let Some(conversation) = conversation else {
        println!("{}", "No active conversation.".yellow());
        return;
    };
    for message in &conversation.messages {
        let role = match message.role {
            Role::User => "user ".green(),
            Role::Model => "model".cyan(),
        };
        println!(
            "  {}  {}  {}",
            short_id(&message.id).dimmed(),
            role,
            first_line(&message.content, 60)
        );
    }
}

fn print_artifacts(conversation: Option<&Conversation>) {
    let Some(conversation) = conversation else {
        println!("{}", "No active conversation.".yellow());
        return;
    };
    if conversation.artifacts.is_empty() {
        println!("  (none)");
        return;
    }
    for artifact in &conversation.artifacts {
        println!(
            "  {}  [{}] {}",
            short_id(&artifact.id).dimmed(),
            artifact.artifact_type,
            artifact.label.as_deref().unwrap_or("(unlabeled)")
        );
    }
}

fn print_conversations(session: &ChatSession) {
    for conversation in session.store().conversations() {
        let marker = if session.store().active_id() == Some(conversation.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            " {} {}  {}",
            marker,
            short_id(&conversation.id).dimmed(),
            conversation.title
        );
    }
}

/// Resolve a user-supplied message id or unique prefix within the active
/// conversation. Falls back to the input unchanged when nothing matches.
fn resolve_message_id(session: &ChatSession, input: &str) -> String {
    session
        .store()
        .active_conversation()
        .and_then(|c| {
            c.messages
                .iter()
                .find(|m| m.id == input || m.id.starts_with(input))
                .map(|m| m.id.clone())
        })
        .unwrap_or_else(|| input.to_string())
}

/// Resolve a conversation id or unique prefix the same way.
fn resolve_conversation_id(session: &ChatSession, input: &str) -> String {
    session
        .store()
        .conversations()
        .iter()
        .find(|c| c.id == input || c.id.starts_with(input))
        .map(|c| c.id.clone())
        .unwrap_or_else(|| input.to_string())
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn first_line(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    let clipped: String = line.chars().take(max_chars).collect();
    if clipped.chars().count() < line.chars().count() {
        format!("{}…", clipped)
    } else {
        clipped
    }
}
