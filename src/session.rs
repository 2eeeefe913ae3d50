//! Chat session: the send pipeline
//!
//! Owns the conversation store, the generation provider, the interface
//! language, and the busy flag. All client state mutation funnels through
//! this one entry point, which keeps the whole-collection-replacement
//! updates race-free in the single-threaded event loop.
//!
//! At most one generation request is in flight per session: `send` rejects
//! while busy, and the flag is cleared on every exit path, success or
//! failure, so it can never be left stuck on.

use crate::error::{AtelierError, Result};
use crate::localization::{translate, Language};
use crate::providers::{Generator, HistoryTurn, InputMode};
use crate::store::{ConversationStore, Message, SnapshotState};

/// Interactive chat session state
pub struct ChatSession {
    store: ConversationStore,
    generator: Box<dyn Generator>,
    language: Language,
    busy: bool,
}

impl ChatSession {
    /// Create a session with an empty conversation store
    pub fn new(generator: Box<dyn Generator>, language: Language) -> Self {
        Self {
            store: ConversationStore::new(),
            generator,
            language,
            busy: false,
        }
    }

    /// Read access to the conversation store
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// The session's interface language
    pub fn language(&self) -> Language {
        self.language
    }

    /// Change the interface language
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Whether a generation request is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Start a fresh empty conversation and make it active
    pub fn new_conversation(&mut self) -> String {
        self.store
            .create_conversation(translate("sidebar.newConversation", self.language))
    }

    /// Make an existing conversation active
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::NotFound` if the id does not resolve.
    pub fn select_conversation(&mut self, conversation_id: &str) -> Result<()> {
        self.store.set_active(conversation_id)
    }

    /// Submit user input and record the model's response
    ///
    /// Creates a conversation when none is active. Empty input with no
    /// images is a no-op. A provider failure is converted into a synthetic
    /// model message embedding the error description, so the conversation
    /// continues normally afterwards.
    ///
    /// # Returns
    ///
    /// The recorded model message, or `None` when the input was a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::SessionBusy` while a request is in flight.
    pub async fn send(
        &mut self,
        prompt: &str,
        images: Vec<String>,
        mode: InputMode,
    ) -> Result<Option<Message>> {
        if self.busy {
            return Err(AtelierError::SessionBusy.into());
        }
        if prompt.is_empty() && images.is_empty() {
            return Ok(None);
        }

        let conversation_id = match self.store.active_id() {
            Some(id) => id.to_string(),
            None => self
                .store
                .create_conversation(translate("sidebar.newConversation", self.language)),
        };

        self.store
            .append_user_message(&conversation_id, prompt, images.clone())?;

        // Prior turns only: everything before the message just appended.
        let history = self.history_before_last(&conversation_id)?;

        self.busy = true;
        let outcome = self
            .generator
            .generate(prompt, &history, &images, mode, self.language)
            .await;
        self.busy = false;

        let message = match outcome {
            Ok(response) => self.store.append_model_message(
                &conversation_id,
                &response.text,
                response.sources,
                response.artifact,
            )?,
            Err(error) => {
                tracing::error!("Generation failed: {}", error);
                self.store.append_model_message(
                    &conversation_id,
                    &format!("Sorry, something went wrong: {}", error),
                    Vec::new(),
                    None,
                )?
            }
        };

        Ok(Some(message))
    }

    /// Edit a past message: branch the active conversation at that message
    /// and submit the replacement text through the normal send pipeline
    ///
    /// A message id that does not resolve in the active conversation is a
    /// no-op; nothing is mutated and no request is issued.
    pub async fn edit_and_branch(
        &mut self,
        message_id: &str,
        new_content: &str,
    ) -> Result<Option<Message>> {
        let Some(active_id) = self.store.active_id().map(String::from) else {
            return Ok(None);
        };

        match self.store.branch(&active_id, message_id) {
            Ok(_) => self.send(new_content, Vec::new(), InputMode::Chat).await,
            Err(error) => {
                if matches!(
                    error.downcast_ref::<AtelierError>(),
                    Some(AtelierError::NotFound(_))
                ) {
                    tracing::warn!("Ignoring branch at unknown message {}", message_id);
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Capture the session state for snapshot persistence
    pub fn snapshot_state(&self) -> SnapshotState {
        SnapshotState {
            conversations: self.store.conversations().to_vec(),
            active_conversation_id: self.store.active_id().map(String::from),
            language: self.language,
        }
    }

    /// Replace the session state from a loaded snapshot
    pub fn restore(&mut self, state: SnapshotState) {
        self.store =
            ConversationStore::from_parts(state.conversations, state.active_conversation_id);
        self.language = state.language;
    }

    fn history_before_last(&self, conversation_id: &str) -> Result<Vec<HistoryTurn>> {
        let conversation = self.store.get(conversation_id).ok_or_else(|| {
            AtelierError::NotFound(format!("conversation {}", conversation_id))
        })?;
        let messages = &conversation.messages;
        let prior = &messages[..messages.len().saturating_sub(1)];
        Ok(prior
            .iter()
            .map(|m| HistoryTurn::new(m.role, m.content.clone()))
            .collect())
    }
}
