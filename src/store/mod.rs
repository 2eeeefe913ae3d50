//! In-memory conversation store
//!
//! Holds the full conversation collection and the active-conversation
//! pointer, and implements the mutation operations the chat session drives:
//! creating conversations, appending messages, and branching a conversation
//! at an edited message.
//!
//! The store is single-owner state; all mutation goes through `&mut self`,
//! which in the single-threaded event loop makes whole-collection updates
//! race-free without locks.

use crate::artifact::{Artifact, ArtifactDraft};
use crate::error::{AtelierError, Result};
use uuid::Uuid;

pub mod snapshot;
pub mod types;

pub use snapshot::{SnapshotState, SnapshotStore};
pub use types::{Conversation, Message, Role, Source};

/// Conversation titles are clipped to this many characters of the first
/// user message.
const TITLE_MAX_CHARS: usize = 30;

/// Title used when the first message carries images but no text.
const IMAGE_ONLY_TITLE: &str = "Image Message";

/// Prefix applied to branch titles. A source title already carrying the
/// prefix is stripped first so titles never stack `Branch: Branch: ...`.
const BRANCH_TITLE_PREFIX: &str = "Branch: ";

/// In-memory collection of conversations with an active pointer
///
/// New conversations are inserted at the front, so iteration order is
/// most-recent-first, matching what the sidebar listing shows.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously persisted parts
    ///
    /// An active id that no longer resolves to a conversation is dropped.
    pub fn from_parts(conversations: Vec<Conversation>, active_id: Option<String>) -> Self {
        let active_id =
            active_id.filter(|id| conversations.iter().any(|c| &c.id == id));
        Self {
            conversations,
            active_id,
        }
    }

    /// All conversations, most recent first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Identifier of the active conversation, if any
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// The active conversation, if any
    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Look up a conversation by identifier
    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    /// Make a conversation active
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::NotFound` if the id does not resolve.
    pub fn set_active(&mut self, conversation_id: &str) -> Result<()> {
        if self.get(conversation_id).is_none() {
            return Err(
                AtelierError::NotFound(format!("conversation {}", conversation_id)).into(),
            );
        }
        self.active_id = Some(conversation_id.to_string());
        Ok(())
    }

    /// Create a new empty conversation and make it active
    ///
    /// # Arguments
    ///
    /// * `title` - Initial display title
    ///
    /// # Returns
    ///
    /// The identifier of the new conversation.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier::store::ConversationStore;
    ///
    /// let mut store = ConversationStore::new();
    /// let id = store.create_conversation("New Conversation");
    /// assert_eq!(store.active_id(), Some(id.as_str()));
    /// ```
    pub fn create_conversation(&mut self, title: impl Into<String>) -> String {
        let conversation = Conversation::new(title);
        let id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.active_id = Some(id.clone());
        tracing::debug!("Created conversation {}", id);
        id
    }

    /// Append a user message to a conversation
    ///
    /// When the conversation has no prior messages, its title is set from
    /// the leading characters of `text` (or a fixed fallback for image-only
    /// messages). Appending to a non-empty conversation leaves the title
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::NotFound` if the conversation does not exist.
    pub fn append_user_message(
        &mut self,
        conversation_id: &str,
        text: &str,
        images: Vec<String>,
    ) -> Result<Message> {
        let title = derive_title(text);
        let conversation = self.get_mut(conversation_id)?;

        if conversation.messages.is_empty() {
            conversation.title = title;
        }

        let message = Message::user(text, images);
        conversation.messages.push(message.clone());
        Ok(message)
    }

    /// Append a model message, recording its artifact if one was drafted
    ///
    /// The draft receives a fresh identifier here; the same textual artifact
    /// recorded twice therefore yields two distinct stored artifacts.
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::NotFound` if the conversation does not exist.
    pub fn append_model_message(
        &mut self,
        conversation_id: &str,
        text: &str,
        sources: Vec<Source>,
        artifact_draft: Option<ArtifactDraft>,
    ) -> Result<Message> {
        let conversation = self.get_mut(conversation_id)?;

        let artifact_id = artifact_draft.map(|draft| {
            let artifact = Artifact::from_draft(Uuid::new_v4().to_string(), draft);
            let id = artifact.id.clone();
            conversation.artifacts.push(artifact);
            id
        });

        let message = Message::model(text, sources, artifact_id);
        conversation.messages.push(message.clone());
        Ok(message)
    }

    /// Branch a conversation at a message
    ///
    /// Creates a new conversation whose message log is an independent copy
    /// of the strict prefix before `at_message_id`; the edited message and
    /// everything after it are dropped. The artifact collection is carried
    /// over element-wise as it stands at branch time; artifacts recorded
    /// later in either conversation do not appear in the other. The new
    /// conversation becomes active.
    ///
    /// # Returns
    ///
    /// The identifier of the new branch conversation.
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::NotFound` if the conversation or the message
    /// does not exist; no mutation occurs in that case.
    pub fn branch(&mut self, conversation_id: &str, at_message_id: &str) -> Result<String> {
        let source = self
            .get(conversation_id)
            .ok_or_else(|| AtelierError::NotFound(format!("conversation {}", conversation_id)))?;

        let index = source.message_index(at_message_id).ok_or_else(|| {
            AtelierError::NotFound(format!("message {}", at_message_id))
        })?;

        let mut branch = Conversation::new(format!(
            "{}{}",
            BRANCH_TITLE_PREFIX,
            source
                .title
                .strip_prefix(BRANCH_TITLE_PREFIX)
                .unwrap_or(&source.title)
        ));
        branch.messages = source.messages[..index].to_vec();
        branch.artifacts = source.artifacts.clone();
        branch.branched_from = Some(source.id.clone());

        let id = branch.id.clone();
        self.conversations.insert(0, branch);
        self.active_id = Some(id.clone());
        tracing::debug!(
            "Branched conversation {} at message {} into {}",
            conversation_id,
            at_message_id,
            id
        );
        Ok(id)
    }

    /// Remove a conversation, clearing the active pointer if it was active
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::NotFound` if the conversation does not exist.
    pub fn delete_conversation(&mut self, conversation_id: &str) -> Result<()> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id == conversation_id)
            .ok_or_else(|| AtelierError::NotFound(format!("conversation {}", conversation_id)))?;
        self.conversations.remove(index);
        if self.active_id.as_deref() == Some(conversation_id) {
            self.active_id = None;
        }
        Ok(())
    }

    fn get_mut(&mut self, conversation_id: &str) -> Result<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| {
                AtelierError::NotFound(format!("conversation {}", conversation_id)).into()
            })
    }
}

/// Derive a conversation title from the first user message text
fn derive_title(text: &str) -> String {
    if text.is_empty() {
        IMAGE_ONLY_TITLE.to_string()
    } else {
        text.chars().take(TITLE_MAX_CHARS).collect()
    }
}
