//! Conversation data model types
//!
//! The serialized field names (`createdAt`, `branchedFrom`, `artifact_id`)
//! match the snapshot format the client has always written, so existing
//! snapshots keep loading across versions.

use crate::artifact::Artifact;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human user
    User,
    /// The generative model
    Model,
}

/// A grounding source attached to a model message
///
/// Purely descriptive; never dereferenced by the client itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Source URI
    pub uri: String,
    /// Optional page title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A single message in a conversation
///
/// Messages are immutable once created; editing a past message never
/// mutates it in place but branches the conversation instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier
    pub id: String,
    /// Sender role
    pub role: Role,
    /// Text content
    pub content: String,
    /// Attached images as base64 data URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Grounding sources for model messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    /// Identifier of the artifact carried by this message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
}

impl Message {
    /// Creates a new user message with a fresh identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier::store::{Message, Role};
    ///
    /// let msg = Message::user("Hello!", Vec::new());
    /// assert_eq!(msg.role, Role::User);
    /// assert!(msg.images.is_none());
    /// ```
    pub fn user(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            images: if images.is_empty() { None } else { Some(images) },
            sources: None,
            artifact_id: None,
        }
    }

    /// Creates a new model message with a fresh identifier
    pub fn model(
        content: impl Into<String>,
        sources: Vec<Source>,
        artifact_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Model,
            content: content.into(),
            images: None,
            sources: if sources.is_empty() { None } else { Some(sources) },
            artifact_id,
        }
    }
}

/// A conversation: an append-only message log plus its owned artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier
    pub id: String,
    /// Display title; defaults to the leading text of the first message
    pub title: String,
    /// Messages in insertion (temporal) order
    pub messages: Vec<Message>,
    /// Artifacts in insertion order, owned by this conversation
    pub artifacts: Vec<Artifact>,
    /// Creation timestamp, RFC-3339
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Identifier of the conversation this one was branched from, if any.
    /// Provenance only; never used for traversal.
    #[serde(rename = "branchedFrom", skip_serializing_if = "Option::is_none")]
    pub branched_from: Option<String>,
}

impl Conversation {
    /// Creates a new empty conversation with a fresh identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier::store::Conversation;
    ///
    /// let convo = Conversation::new("My chat");
    /// assert_eq!(convo.title, "My chat");
    /// assert!(convo.messages.is_empty());
    /// assert!(convo.branched_from.is_none());
    /// ```
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            artifacts: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
            branched_from: None,
        }
    }

    /// Index of a message within this conversation, if present
    pub fn message_index(&self, message_id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id)
    }

    /// Look up an owned artifact by identifier
    pub fn artifact(&self, artifact_id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_has_fresh_id() {
        let a = Message::user("hi", Vec::new());
        let b = Message::user("hi", Vec::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_user_message_empty_images_serializes_without_field() {
        let msg = Message::user("hi", Vec::new());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("images"));
        assert!(!json.contains("artifact_id"));
    }

    #[test]
    fn test_model_message_links_artifact() {
        let msg = Message::model("done", Vec::new(), Some("art-1".into()));
        assert_eq!(msg.role, Role::Model);
        assert_eq!(msg.artifact_id.as_deref(), Some("art-1"));
    }

    #[test]
    fn test_role_serde_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn test_conversation_serde_field_names() {
        let convo = Conversation::new("t");
        let json = serde_json::to_string(&convo).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("branchedFrom"));

        let mut branched = Conversation::new("b");
        branched.branched_from = Some(convo.id.clone());
        let json = serde_json::to_string(&branched).unwrap();
        assert!(json.contains("\"branchedFrom\""));
    }

    #[test]
    fn test_message_index() {
        let mut convo = Conversation::new("t");
        convo.messages.push(Message::user("one", Vec::new()));
        convo.messages.push(Message::user("two", Vec::new()));

        let second_id = convo.messages[1].id.clone();
        assert_eq!(convo.message_index(&second_id), Some(1));
        assert_eq!(convo.message_index("missing"), None);
    }

    #[test]
    fn test_conversation_roundtrip() {
        let mut convo = Conversation::new("roundtrip");
        convo.messages.push(Message::user("hello", Vec::new()));
        convo
            .messages
            .push(Message::model("world", vec![Source { uri: "https://example.com".into(), title: Some("Example".into()) }], None));

        let json = serde_json::to_string(&convo).unwrap();
        let back: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, convo);
    }
}
