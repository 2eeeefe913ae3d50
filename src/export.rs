//! Artifact file export
//!
//! Turns a stored artifact into downloadable file content. Extension and
//! MIME type come from a fixed per-type table; chart datasets are written
//! as pretty-printed JSON, and image references are resolved to their
//! binary content (data URLs decoded locally, remote URLs fetched).

use crate::artifact::{Artifact, ArtifactData, ArtifactType};
use crate::error::{AtelierError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// A file ready to be written to disk or offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name, `{label-or-type}-artifact{ext}`
    pub file_name: String,
    /// MIME type from the per-type table
    pub mime_type: &'static str,
    /// File content
    pub bytes: Vec<u8>,
}

/// File extension for an artifact type
pub fn extension(artifact_type: ArtifactType) -> &'static str {
    match artifact_type {
        ArtifactType::React => ".jsx",
        ArtifactType::Chart => ".json",
        ArtifactType::Html => ".html",
        ArtifactType::Markdown => ".md",
        ArtifactType::Image => ".jpeg",
        ArtifactType::Text => ".txt",
    }
}

/// MIME type for an artifact type
pub fn mime_type(artifact_type: ArtifactType) -> &'static str {
    match artifact_type {
        ArtifactType::React => "text/jsx",
        ArtifactType::Chart => "application/json",
        ArtifactType::Html => "text/html",
        ArtifactType::Markdown => "text/markdown",
        ArtifactType::Image => "image/jpeg",
        ArtifactType::Text => "text/plain",
    }
}

/// Produce the downloadable file for an artifact
///
/// # Errors
///
/// Returns `AtelierError::Export` when an image reference cannot be
/// decoded or fetched, and propagates serialization errors for chart
/// payloads.
///
/// # Examples
///
/// ```no_run
/// use atelier::artifact::{Artifact, ArtifactDraft, ArtifactType};
/// use atelier::export::export_artifact;
///
/// # async fn example() -> atelier::error::Result<()> {
/// let draft = ArtifactDraft::new(ArtifactType::Markdown, Some("Notes".into()), "# hi".into());
/// let artifact = Artifact::from_draft("a1", draft);
/// let file = export_artifact(&artifact).await?;
/// assert_eq!(file.file_name, "Notes-artifact.md");
/// # Ok(())
/// # }
/// ```
pub async fn export_artifact(artifact: &Artifact) -> Result<ExportFile> {
    let type_name = artifact.artifact_type.to_string();
    let stem = artifact.label.as_deref().unwrap_or(&type_name);
    let file_name = format!("{}-artifact{}", stem, extension(artifact.artifact_type));

    let bytes = if artifact.artifact_type == ArtifactType::Image {
        let reference = artifact.data.as_text().ok_or_else(|| {
            AtelierError::Export("image artifact does not carry a reference".into())
        })?;
        image_bytes(reference).await?
    } else {
        match &artifact.data {
            ArtifactData::Text(s) => s.clone().into_bytes(),
            ArtifactData::Records(records) => serde_json::to_vec_pretty(records)?,
        }
    };

    Ok(ExportFile {
        file_name,
        mime_type: mime_type(artifact.artifact_type),
        bytes,
    })
}

/// Resolve an image reference to its binary content
///
/// Base64 data URLs are decoded locally; anything else is fetched over
/// HTTP.
async fn image_bytes(reference: &str) -> Result<Vec<u8>> {
    if let Some(rest) = reference.strip_prefix("data:") {
        let payload = rest
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| {
                AtelierError::Export("image data URL is not base64-encoded".into())
            })?;
        return BASE64
            .decode(payload)
            .map_err(|e| AtelierError::Export(format!("invalid base64 image data: {}", e)).into());
    }

    let response = reqwest::get(reference).await?;
    if !response.status().is_success() {
        return Err(AtelierError::Export(format!(
            "image fetch returned status {}",
            response.status()
        ))
        .into());
    }
    Ok(response.bytes().await?.to_vec())
}
