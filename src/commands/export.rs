//! Export command handler: write an artifact from a stored conversation
//! to a file

use crate::config::Config;
use crate::error::{AtelierError, Result};
use crate::export::export_artifact;
use crate::store::SnapshotStore;
use colored::Colorize;
use std::path::PathBuf;

/// Export an artifact to a file in the output directory
///
/// Conversation and artifact identifiers accept unique prefixes. The file
/// name and extension come from the artifact's label and type.
pub async fn run_export(
    config: &Config,
    conversation_id: &str,
    artifact_id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let snapshot = match &config.storage.snapshot_path {
        Some(path) => SnapshotStore::new(path)?,
        None => SnapshotStore::open_default()?,
    };
    let state = snapshot.load();

    let conversation = state
        .conversations
        .iter()
        .find(|c| c.id == conversation_id || c.id.starts_with(conversation_id))
        .ok_or_else(|| AtelierError::NotFound(format!("conversation {}", conversation_id)))?;

    let artifact = conversation
        .artifacts
        .iter()
        .find(|a| a.id == artifact_id || a.id.starts_with(artifact_id))
        .ok_or_else(|| AtelierError::NotFound(format!("artifact {}", artifact_id)))?;

    let file = export_artifact(artifact).await?;

    let directory = output.unwrap_or_else(|| PathBuf::from("."));
    let path = directory.join(&file.file_name);
    std::fs::write(&path, &file.bytes)?;

    println!(
        "{}",
        format!(
            "Wrote {} ({} bytes, {})",
            path.display(),
            file.bytes.len(),
            file.mime_type
        )
        .green()
    );
    Ok(())
}
