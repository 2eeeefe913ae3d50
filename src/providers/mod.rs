//! Generation provider module
//!
//! Contains the provider abstraction the chat session talks to and the
//! Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{GeneratedResponse, Generator, HistoryTurn, InputMode};
pub use gemini::GeminiGenerator;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a generator instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a boxed generator instance
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
pub fn create_generator(config: &ProviderConfig) -> Result<Box<dyn Generator>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Box::new(GeminiGenerator::new(config.gemini.clone())?)),
        other => Err(crate::error::AtelierError::Provider(format!(
            "Unknown provider type: {}",
            other
        ))
        .into()),
    }
}
