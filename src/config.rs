//! Configuration management for Atelier
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AtelierError, Result};
use crate::localization::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Main configuration structure for Atelier
///
/// Holds everything the client needs: generation provider settings, chat
/// defaults, and snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generation provider configuration
    pub provider: ProviderConfig,

    /// Chat defaults
    #[serde(default)]
    pub chat: ChatConfig,

    /// Snapshot storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Generation provider configuration
///
/// Specifies which provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model used for text generation
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Model used for image generation
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// API base URL (useful for tests and local mocks)
    ///
    /// When set, endpoints (e.g. `:generateContent`, `:predict`) are built
    /// against this base, which lets tests point the provider at a mock
    /// server.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-3.0-generate-002".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            image_model: default_image_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Chat defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Interface language used when the snapshot has none persisted
    #[serde(default)]
    pub language: Language,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
        }
    }
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot database path override; the user data directory is used
    /// when unset
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

impl Config {
    /// Load configuration from a file with env and CLI overrides applied
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments, applied as overrides
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::Config` if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AtelierError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AtelierError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("ATELIER_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("ATELIER_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("ATELIER_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(language) = std::env::var("ATELIER_LANGUAGE") {
            match Language::from_str(&language) {
                Ok(lang) => self.chat.language = lang,
                Err(_) => tracing::warn!("Invalid ATELIER_LANGUAGE: {}", language),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            self.storage.snapshot_path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::Config` when a setting is unusable.
    pub fn validate(&self) -> Result<()> {
        match self.provider.provider_type.as_str() {
            "gemini" => {}
            other => {
                return Err(AtelierError::Config(format!(
                    "Unknown provider type: {}",
                    other
                ))
                .into())
            }
        }

        if self.provider.gemini.model.is_empty() {
            return Err(AtelierError::Config("Gemini model must not be empty".into()).into());
        }

        if self.provider.gemini.api_base.is_empty() {
            return Err(AtelierError::Config("API base must not be empty".into()).into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
