//! Error types for Atelier
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Atelier operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, generation requests, store mutation, snapshot
/// persistence, and artifact export.
#[derive(Error, Debug)]
pub enum AtelierError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation provider errors (API calls, authentication, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// A referenced conversation or message does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A send was attempted while a generation request is in flight
    #[error("A request is already in progress")]
    SessionBusy,

    /// An attached image payload is not a well-formed data URL
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// Missing credentials for a provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Artifact export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Snapshot storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Atelier operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AtelierError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = AtelierError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_not_found_error_display() {
        let error = AtelierError::NotFound("message abc123".to_string());
        assert_eq!(error.to_string(), "Not found: message abc123");
    }

    #[test]
    fn test_session_busy_error_display() {
        let error = AtelierError::SessionBusy;
        assert_eq!(error.to_string(), "A request is already in progress");
    }

    #[test]
    fn test_invalid_image_error_display() {
        let error = AtelierError::InvalidImage("missing base64 payload".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid image data: missing base64 payload"
        );
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = AtelierError::MissingCredentials("gemini".to_string());
        assert_eq!(
            error.to_string(),
            "Missing credentials for provider: gemini"
        );
    }

    #[test]
    fn test_export_error_display() {
        let error = AtelierError::Export("fetch failed".to_string());
        assert_eq!(error.to_string(), "Export error: fetch failed");
    }

    #[test]
    fn test_storage_error_display() {
        let error = AtelierError::Storage("database unavailable".to_string());
        assert_eq!(error.to_string(), "Storage error: database unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AtelierError = io_error.into();
        assert!(matches!(error, AtelierError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: AtelierError = json_error.into();
        assert!(matches!(error, AtelierError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: AtelierError = yaml_error.into();
        assert!(matches!(error, AtelierError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AtelierError>();
    }
}
