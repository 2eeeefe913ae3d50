//! Interface language and built-in translation strings
//!
//! The client ships with English and Japanese strings. Lookups fall back to
//! English when a key is missing for the selected language, and to the key
//! itself when it is unknown entirely, so a stale key never panics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interface language for the client
///
/// The selected language is part of the persisted snapshot and is passed to
/// the generation provider so responses come back in the user's language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    En,
    /// Japanese
    Ja,
}

impl Default for Language {
    fn default() -> Self {
        Self::Ja
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ja => write!(f, "ja"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "ja" | "japanese" => Ok(Self::Ja),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

/// Look up a translated string for the given key
///
/// Falls back to the English string when the key has no translation in the
/// requested language, and to the key itself when the key is unknown.
///
/// # Examples
///
/// ```
/// use atelier::localization::{translate, Language};
///
/// assert_eq!(translate("sidebar.newConversation", Language::En), "New Conversation");
/// assert_eq!(translate("no.such.key", Language::Ja), "no.such.key");
/// ```
pub fn translate(key: &str, lang: Language) -> String {
    lookup(key, lang)
        .or_else(|| lookup(key, Language::En))
        .unwrap_or(key)
        .to_string()
}

fn lookup(key: &str, lang: Language) -> Option<&'static str> {
    match (key, lang) {
        ("sidebar.newConversation", Language::En) => Some("New Conversation"),
        ("sidebar.newConversation", Language::Ja) => Some("新しい会話"),
        ("chat.imagesNotAllowed", Language::En) => Some("Images cannot be sent in this mode."),
        ("chat.imagesNotAllowed", Language::Ja) => Some("このモードでは画像を送信できません。"),
        ("artifact.panel.empty", Language::En) => Some("No artifact to display"),
        ("artifact.panel.empty", Language::Ja) => Some("表示するアーティファクトがありません"),
        ("artifact.header.label", Language::En) => Some("Artifact"),
        ("artifact.header.label", Language::Ja) => Some("アーティファクト"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_known_key_english() {
        assert_eq!(
            translate("sidebar.newConversation", Language::En),
            "New Conversation"
        );
    }

    #[test]
    fn test_translate_known_key_japanese() {
        assert_eq!(translate("sidebar.newConversation", Language::Ja), "新しい会話");
    }

    #[test]
    fn test_translate_unknown_key_returns_key() {
        assert_eq!(translate("missing.key", Language::En), "missing.key");
        assert_eq!(translate("missing.key", Language::Ja), "missing.key");
    }

    #[test]
    fn test_language_parse_str() {
        assert_eq!(Language::from_str("en").unwrap(), Language::En);
        assert_eq!(Language::from_str("JA").unwrap(), Language::Ja);
        assert!(Language::from_str("fr").is_err());
    }

    #[test]
    fn test_language_display_roundtrip() {
        assert_eq!(Language::from_str(&Language::En.to_string()).unwrap(), Language::En);
        assert_eq!(Language::from_str(&Language::Ja.to_string()).unwrap(), Language::Ja);
    }

    #[test]
    fn test_language_serde_wire_names() {
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
        let parsed: Language = serde_json::from_str("\"ja\"").unwrap();
        assert_eq!(parsed, Language::Ja);
    }

    #[test]
    fn test_default_language_is_japanese() {
        assert_eq!(Language::default(), Language::Ja);
    }
}
