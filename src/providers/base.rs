//! Generation provider trait and common types
//!
//! This module defines the `Generator` trait the chat session talks to,
//! along with the input mode tags and the structured response a provider
//! returns. The session treats the provider as an opaque collaborator; its
//! prompting strategy lives entirely behind this trait.

use crate::artifact::ArtifactDraft;
use crate::error::Result;
use crate::localization::Language;
use crate::store::{Role, Source};
use async_trait::async_trait;

/// Input mode for a send action
///
/// Selects which generation path the provider takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Regular conversational turn
    Chat,
    /// Image generation from the prompt
    Image,
    /// Search-grounded answer with sources
    Research,
    /// Long-form research report delivered as a markdown artifact
    DeepResearch,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Image => write!(f, "image"),
            Self::Research => write!(f, "research"),
            Self::DeepResearch => write!(f, "deep-research"),
        }
    }
}

impl InputMode {
    /// Parse an input mode from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier::providers::InputMode;
    ///
    /// let mode = InputMode::parse_str("deep-research").unwrap();
    /// assert_eq!(mode, InputMode::DeepResearch);
    /// ```
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "image" => Ok(Self::Image),
            "research" => Ok(Self::Research),
            "deep-research" | "deep_research" => Ok(Self::DeepResearch),
            other => Err(crate::error::AtelierError::Config(format!(
                "Unknown input mode: {}",
                other
            ))
            .into()),
        }
    }
}

/// One prior turn of conversation history passed to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTurn {
    /// Who spoke
    pub role: Role,
    /// What was said (text only; artifacts are not replayed)
    pub text: String,
}

impl HistoryTurn {
    /// Create a history turn
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Structured provider response
///
/// The text is what the chat transcript shows; the optional draft is the
/// structured side-payload the store records alongside the message.
#[derive(Debug, Clone, Default)]
pub struct GeneratedResponse {
    /// Display text for the model message
    pub text: String,
    /// Grounding sources, when the mode produces them
    pub sources: Vec<Source>,
    /// Extracted or synthesized artifact, prior to id assignment
    pub artifact: Option<ArtifactDraft>,
}

impl GeneratedResponse {
    /// A plain text response with no sources and no artifact
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Generation provider trait
///
/// All generation backends must implement this trait. The session calls it
/// once per send action with the full prior history.
///
/// # Examples
///
/// ```no_run
/// use atelier::providers::{Generator, GeneratedResponse, HistoryTurn, InputMode};
/// use atelier::localization::Language;
/// use atelier::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoGenerator;
///
/// #[async_trait]
/// impl Generator for EchoGenerator {
///     async fn generate(
///         &self,
///         prompt: &str,
///         _history: &[HistoryTurn],
///         _images: &[String],
///         _mode: InputMode,
///         _language: Language,
///     ) -> Result<GeneratedResponse> {
///         Ok(GeneratedResponse::text_only(prompt.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a response for one send action
    ///
    /// # Arguments
    ///
    /// * `prompt` - The new user input
    /// * `history` - Prior turns, oldest first, excluding `prompt`
    /// * `images` - Attached images as base64 data URLs
    /// * `mode` - Which generation path to take
    /// * `language` - Language the response should be written in
    ///
    /// # Errors
    ///
    /// Returns an error when the transport or the provider fails; the
    /// session converts such failures into a synthetic model message.
    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
        images: &[String],
        mode: InputMode,
        language: Language,
    ) -> Result<GeneratedResponse>;
}
