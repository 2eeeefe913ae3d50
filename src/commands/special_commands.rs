//! Slash-command parser for the interactive chat loop
//!
//! Lines starting with `/` are session commands rather than prompts. The
//! parser is deliberately forgiving: an unknown command becomes `Unknown`
//! so the loop can print help instead of sending it to the model.

use crate::localization::Language;
use crate::providers::InputMode;
use colored::Colorize;

/// A parsed special command
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCommand {
    /// Start a new empty conversation
    New,
    /// Branch the active conversation at a message and resend
    Branch {
        /// Identifier (or unique prefix) of the message being edited
        message_id: String,
        /// Replacement text submitted into the branch
        new_content: String,
    },
    /// Switch the input mode
    SwitchMode(InputMode),
    /// Switch the interface language
    SwitchLanguage(Language),
    /// List the active conversation's messages with their identifiers
    Messages,
    /// List the active conversation's artifacts
    Artifacts,
    /// List stored conversations and switch with `/open <id>`
    Conversations,
    /// Make another conversation active
    Open(String),
    /// Show help
    Help,
    /// Leave the chat loop
    Exit,
    /// Not a special command; treat the line as a prompt
    None,
    /// Unrecognized or malformed special command
    Unknown(String),
}

/// Parse a line of user input into a special command
///
/// # Examples
///
/// ```
/// use atelier::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new"), SpecialCommand::New);
/// assert_eq!(parse_special_command("hello"), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> SpecialCommand {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return SpecialCommand::None;
    }

    let mut parts = trimmed.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();

    match command {
        "/new" => SpecialCommand::New,
        "/branch" => {
            let message_id = parts.next().unwrap_or_default().to_string();
            let new_content = parts.next().unwrap_or_default().trim().to_string();
            if message_id.is_empty() || new_content.is_empty() {
                SpecialCommand::Unknown(
                    "usage: /branch <message-id> <replacement text>".to_string(),
                )
            } else {
                SpecialCommand::Branch {
                    message_id,
                    new_content,
                }
            }
        }
        "/mode" => match parts.next().map(InputMode::parse_str) {
            Some(Ok(mode)) => SpecialCommand::SwitchMode(mode),
            _ => SpecialCommand::Unknown(
                "usage: /mode <chat|image|research|deep-research>".to_string(),
            ),
        },
        "/lang" => match parts.next().map(str::parse::<Language>) {
            Some(Ok(language)) => SpecialCommand::SwitchLanguage(language),
            _ => SpecialCommand::Unknown("usage: /lang <en|ja>".to_string()),
        },
        "/messages" => SpecialCommand::Messages,
        "/artifacts" => SpecialCommand::Artifacts,
        "/conversations" => SpecialCommand::Conversations,
        "/open" => match parts.next() {
            Some(id) if !id.is_empty() => SpecialCommand::Open(id.to_string()),
            _ => SpecialCommand::Unknown("usage: /open <conversation-id>".to_string()),
        },
        "/help" => SpecialCommand::Help,
        "/exit" | "/quit" => SpecialCommand::Exit,
        other => SpecialCommand::Unknown(format!("unknown command: {}", other)),
    }
}

/// Print the special-command help text
pub fn print_help() {
    println!();
    println!("{}", "Commands:".bold());
    println!("  /new                          start a new conversation");
    println!("  /open <id>                    switch to a conversation");
    println!("  /conversations                list conversations");
    println!("  /messages                     list messages with their ids");
    println!("  /artifacts                    list the conversation's artifacts");
    println!("  /branch <message-id> <text>   edit a past message into a new branch");
    println!("  /mode <m>                     chat | image | research | deep-research");
    println!("  /lang <l>                     en | ja");
    println!("  /help                         show this help");
    println!("  /exit                         quit");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_input_is_none() {
        assert_eq!(parse_special_command("tell me a story"), SpecialCommand::None);
        assert_eq!(parse_special_command(""), SpecialCommand::None);
    }

    #[test]
    fn test_parse_new() {
        assert_eq!(parse_special_command("/new"), SpecialCommand::New);
    }

    #[test]
    fn test_parse_branch() {
        let parsed = parse_special_command("/branch abc123 tell me again, but shorter");
        assert_eq!(
            parsed,
            SpecialCommand::Branch {
                message_id: "abc123".to_string(),
                new_content: "tell me again, but shorter".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_branch_missing_text_is_unknown() {
        assert!(matches!(
            parse_special_command("/branch abc123"),
            SpecialCommand::Unknown(_)
        ));
        assert!(matches!(
            parse_special_command("/branch"),
            SpecialCommand::Unknown(_)
        ));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            parse_special_command("/mode research"),
            SpecialCommand::SwitchMode(InputMode::Research)
        );
        assert!(matches!(
            parse_special_command("/mode warp"),
            SpecialCommand::Unknown(_)
        ));
    }

    #[test]
    fn test_parse_lang() {
        assert_eq!(
            parse_special_command("/lang en"),
            SpecialCommand::SwitchLanguage(Language::En)
        );
        assert!(matches!(
            parse_special_command("/lang xx"),
            SpecialCommand::Unknown(_)
        ));
    }

    #[test]
    fn test_parse_open() {
        assert_eq!(
            parse_special_command("/open c-42"),
            SpecialCommand::Open("c-42".to_string())
        );
    }

    #[test]
    fn test_parse_exit_aliases() {
        assert_eq!(parse_special_command("/exit"), SpecialCommand::Exit);
        assert_eq!(parse_special_command("/quit"), SpecialCommand::Exit);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(matches!(
            parse_special_command("/frobnicate"),
            SpecialCommand::Unknown(_)
        ));
    }
}
