//! Snapshot persistence for the conversation collection
//!
//! The full client state (conversation collection, active conversation
//! id, and interface language) round-trips as JSON through an embedded
//! `sled` key-value database under three fixed keys.
//!
//! Loading is best-effort by design: a missing or corrupt value falls back
//! to its default (an empty conversation set) with a logged warning, so a
//! damaged snapshot can never prevent the client from starting.

use crate::error::{AtelierError, Result};
use crate::localization::Language;
use crate::store::types::Conversation;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::Path;

const CONVERSATIONS_KEY: &str = "conversations";
const ACTIVE_ID_KEY: &str = "active_conversation_id";
const LANGUAGE_KEY: &str = "language";

/// The persisted client state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotState {
    /// All conversations, most recent first
    pub conversations: Vec<Conversation>,
    /// Identifier of the conversation that was active, if any
    pub active_conversation_id: Option<String>,
    /// Selected interface language
    pub language: Language,
}

/// Snapshot persistence manager
///
/// Wraps an embedded `sled` database holding the serialized client state.
pub struct SnapshotStore {
    db: Db,
}

impl SnapshotStore {
    /// Open or create a snapshot store at the given path
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::Storage` if the database cannot be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use atelier::store::SnapshotStore;
    ///
    /// # fn main() -> atelier::error::Result<()> {
    /// let store = SnapshotStore::new("/tmp/atelier-snapshot")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| AtelierError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Open the snapshot store at its default location
    ///
    /// The default lives in the user's data directory. The
    /// `ATELIER_SNAPSHOT_DB` environment variable overrides the path, which
    /// makes it easy to point the binary at a test database or alternate
    /// file without touching the user's application data.
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::Storage` if no data directory can be
    /// determined or the database cannot be opened.
    pub fn open_default() -> Result<Self> {
        if let Ok(override_path) = std::env::var("ATELIER_SNAPSHOT_DB") {
            return Self::new(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "atelier-chat", "atelier")
            .ok_or_else(|| AtelierError::Storage("Could not determine data directory".into()))?;
        let path = proj_dirs.data_dir().join("snapshot");
        Self::new(path)
    }

    /// Load the persisted state, falling back to defaults on any failure
    ///
    /// Never errors: a missing or unparseable value simply yields its
    /// default, with a warning logged for the corrupt case.
    pub fn load(&self) -> SnapshotState {
        SnapshotState {
            conversations: self.read_json(CONVERSATIONS_KEY).unwrap_or_default(),
            active_conversation_id: self.read_json(ACTIVE_ID_KEY).unwrap_or_default(),
            language: self.read_json(LANGUAGE_KEY).unwrap_or_default(),
        }
    }

    /// Persist the full state under the three snapshot keys
    ///
    /// # Errors
    ///
    /// Returns `AtelierError::Storage` if serialization or a write fails.
    /// Callers treat a failed save as non-fatal and log it.
    pub fn save(&self, state: &SnapshotState) -> Result<()> {
        self.write_json(CONVERSATIONS_KEY, &state.conversations)?;
        self.write_json(ACTIVE_ID_KEY, &state.active_conversation_id)?;
        self.write_json(LANGUAGE_KEY, &state.language)?;

        self.db
            .flush()
            .map_err(|e| AtelierError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.db.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Snapshot read failed for key {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Corrupt snapshot value for key {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| AtelierError::Storage(format!("Serialization failed: {}", e)))?;
        self.db
            .insert(key, bytes)
            .map_err(|e| AtelierError::Storage(format!("Insert failed: {}", e)))?;
        Ok(())
    }
}
