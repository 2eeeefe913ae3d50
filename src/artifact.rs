//! Artifact types and the fenced-block extractor
//!
//! Assistant responses may carry at most one structured artifact, embedded
//! in the response text as a fenced block. This module defines the artifact
//! types and the extractor that scans raw response text, classifies the
//! first recognized fence, and returns the remaining prose alongside the
//! parsed payload.
//!
//! # Fence Syntax
//!
//! - React component source: `` ```react (label: Counter) ... ``` ``
//! - Chart dataset: `` ```json-chart (label: Sales) [ {..}, {..} ] ``` ``
//! - HTML fragment: `` ```html ... ``` ``
//! - Markdown document: `` ```markdown ... ``` ``
//!
//! The `(label: ...)` clause is optional. Only the first recognized fence
//! is extracted; later fences stay in the display text untouched.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Classification of an artifact payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    /// React component source code
    React,
    /// Chart dataset (a sequence of uniform key-value records)
    Chart,
    /// Raw HTML fragment
    Html,
    /// Markdown document
    Markdown,
    /// Image reference (a URL or base64 data URL)
    Image,
    /// Plain text
    Text,
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::React => write!(f, "react"),
            Self::Chart => write!(f, "chart"),
            Self::Html => write!(f, "html"),
            Self::Markdown => write!(f, "markdown"),
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Payload of an artifact
///
/// Source-bearing types (react, html, markdown, text) and image references
/// carry a string; chart artifacts carry the parsed record sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactData {
    /// A sequence of key-value records backing a chart
    Records(Vec<Map<String, Value>>),
    /// Source code, markup, plain text, or an image reference
    Text(String),
}

impl ArtifactData {
    /// View the payload as a string slice, if it is textual
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Records(_) => None,
        }
    }

    /// View the payload as a record sequence, if it is one
    pub fn as_records(&self) -> Option<&[Map<String, Value>]> {
        match self {
            Self::Records(r) => Some(r),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for ArtifactData {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ArtifactData {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// An artifact payload prior to identifier assignment
///
/// The extractor and the generation providers produce drafts; the
/// conversation store assigns the identifier when the draft is recorded, so
/// the same textual artifact extracted twice yields two distinct artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDraft {
    /// Artifact classification
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Optional human-readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Type-dependent payload
    pub data: ArtifactData,
}

impl ArtifactDraft {
    /// Create a draft with the given type and payload
    pub fn new(artifact_type: ArtifactType, label: Option<String>, data: ArtifactData) -> Self {
        Self {
            artifact_type,
            label,
            data,
        }
    }
}

/// A stored artifact owned by a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique identifier, assigned by the conversation store
    pub id: String,
    /// Artifact classification
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Optional human-readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Type-dependent payload
    pub data: ArtifactData,
    /// Set while an asynchronous payload is still being populated
    #[serde(rename = "isLoading", skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
    /// Set when asynchronous population failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Artifact {
    /// Materialize a draft under a freshly assigned identifier
    pub fn from_draft(id: impl Into<String>, draft: ArtifactDraft) -> Self {
        Self {
            id: id.into(),
            artifact_type: draft.artifact_type,
            label: draft.label,
            data: draft.data,
            is_loading: None,
            error: None,
        }
    }
}

/// Fence pattern: kind tag, optional label clause, then the body up to the
/// closing marker. The alternation is closed, so an unrecognized kind tag
/// fails the whole match rather than extracting partially.
const FENCE_PATTERN: &str =
    r"```(react|json-chart|html|markdown)(?:\s*\(label:\s*([^)]+)\))?\s*([\s\S]+?)```";

/// Extract the first recognized artifact fence from raw response text
///
/// Returns the display text (the input with the fence removed and the
/// remainder trimmed) and the extracted draft, if any. At most one artifact
/// is produced per response; text past the first fence is not scanned again.
///
/// A `json-chart` body that does not parse as a sequence of records yields a
/// plain-text artifact embedding the parse error, and the display text
/// reverts to the original, untrimmed input with the fence still in place.
/// That asymmetry is observable, relied-upon behavior.
///
/// # Arguments
///
/// * `raw_text` - The raw assistant response text
///
/// # Examples
///
/// ```
/// use atelier::artifact::{extract, ArtifactType};
///
/// let (display, artifact) = extract("intro ```react (label: Foo)\ncode\n``` outro");
/// assert_eq!(display, "intro  outro");
/// let artifact = artifact.unwrap();
/// assert_eq!(artifact.artifact_type, ArtifactType::React);
/// assert_eq!(artifact.label.as_deref(), Some("Foo"));
/// ```
pub fn extract(raw_text: &str) -> (String, Option<ArtifactDraft>) {
    let fence = Regex::new(FENCE_PATTERN).expect("fence pattern is valid");

    let Some(caps) = fence.captures(raw_text) else {
        return (raw_text.trim().to_string(), None);
    };

    let whole = caps.get(0).expect("capture group 0 always present");
    let kind = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let label = caps.get(2).map(|m| m.as_str().trim().to_string());
    let body = caps
        .get(3)
        .map(|m| m.as_str().trim())
        .unwrap_or_default();

    // Display text: input with the whole fence region removed, then trimmed.
    let mut display = String::with_capacity(raw_text.len());
    display.push_str(&raw_text[..whole.start()]);
    display.push_str(&raw_text[whole.end()..]);
    let display = display.trim().to_string();

    match kind {
        "react" => (
            display,
            Some(ArtifactDraft::new(ArtifactType::React, label, body.into())),
        ),
        "html" => (
            display,
            Some(ArtifactDraft::new(ArtifactType::Html, label, body.into())),
        ),
        "markdown" => (
            display,
            Some(ArtifactDraft::new(
                ArtifactType::Markdown,
                label,
                body.into(),
            )),
        ),
        "json-chart" => match serde_json::from_str::<Vec<Map<String, Value>>>(body) {
            Ok(records) => (
                display,
                Some(ArtifactDraft::new(
                    ArtifactType::Chart,
                    label,
                    ArtifactData::Records(records),
                )),
            ),
            // Failure path keeps the fence in the display text, untrimmed.
            Err(e) => (
                raw_text.to_string(),
                Some(ArtifactDraft::new(
                    ArtifactType::Text,
                    None,
                    format!("Invalid JSON for chart: {}", e).into(),
                )),
            ),
        },
        _ => (display, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_no_fence_returns_trimmed_input() {
        let (display, artifact) = extract("  plain prose, nothing fenced  ");
        assert_eq!(display, "plain prose, nothing fenced");
        assert!(artifact.is_none());
    }

    #[test]
    fn test_extract_react_with_label() {
        let input = "intro ```react (label: Foo)\ncode\n``` outro";
        let (display, artifact) = extract(input);

        assert_eq!(display, "intro  outro");
        let artifact = artifact.expect("expected react artifact");
        assert_eq!(artifact.artifact_type, ArtifactType::React);
        assert_eq!(artifact.label.as_deref(), Some("Foo"));
        assert_eq!(artifact.data.as_text(), Some("code"));
    }

    #[test]
    fn test_extract_react_without_label() {
        let input = "```react\nconst x = 1;\n```";
        let (display, artifact) = extract(input);

        assert_eq!(display, "");
        let artifact = artifact.unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::React);
        assert_eq!(artifact.label, None);
        assert_eq!(artifact.data.as_text(), Some("const x = 1;"));
    }

    #[test]
    fn test_extract_html_fragment() {
        let input = "here ```html\n<p>hello</p>\n``` done";
        let (display, artifact) = extract(input);

        assert_eq!(display, "here  done");
        let artifact = artifact.unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::Html);
        assert_eq!(artifact.data.as_text(), Some("<p>hello</p>"));
    }

    #[test]
    fn test_extract_markdown_document() {
        let input = "```markdown (label: Notes)\n# Title\n\nBody.\n```";
        let (_, artifact) = extract(input);

        let artifact = artifact.unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::Markdown);
        assert_eq!(artifact.label.as_deref(), Some("Notes"));
        assert_eq!(artifact.data.as_text(), Some("# Title\n\nBody."));
    }

    #[test]
    fn test_extract_valid_chart() {
        let input = "```json-chart (label: Sales)\n[{\"month\": \"Jan\", \"value\": 3}]\n```";
        let (display, artifact) = extract(input);

        assert_eq!(display, "");
        let artifact = artifact.unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::Chart);
        assert_eq!(artifact.label.as_deref(), Some("Sales"));
        let records = artifact.data.as_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["month"], "Jan");
    }

    #[test]
    fn test_extract_invalid_chart_keeps_original_text() {
        let input = "  leading ```json-chart\n{not valid json}\n``` trailing  ";
        let (display, artifact) = extract(input);

        // Failure path: fence is NOT stripped and the input is NOT trimmed.
        assert_eq!(display, input);
        let artifact = artifact.unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::Text);
        assert_eq!(artifact.label, None);
        assert!(artifact
            .data
            .as_text()
            .unwrap()
            .contains("Invalid JSON"));
    }

    #[test]
    fn test_extract_chart_rejects_non_record_json() {
        // Valid JSON, but not a sequence of records.
        let input = "```json-chart\n{\"a\": 1}\n```";
        let (display, artifact) = extract(input);

        assert_eq!(display, input);
        assert_eq!(artifact.unwrap().artifact_type, ArtifactType::Text);
    }

    #[test]
    fn test_extract_unrecognized_kind_is_no_artifact() {
        let input = "look: ```python\nprint('hi')\n```";
        let (display, artifact) = extract(input);

        assert!(artifact.is_none());
        assert_eq!(display, input.trim());
    }

    #[test]
    fn test_extract_only_first_fence() {
        let input = "```react\nfirst\n``` middle ```html\n<b>second</b>\n```";
        let (display, artifact) = extract(input);

        let artifact = artifact.unwrap();
        assert_eq!(artifact.artifact_type, ArtifactType::React);
        // Second fence survives in the display text unscanned.
        assert!(display.contains("```html"));
    }

    #[test]
    fn test_extract_unclosed_fence_is_no_artifact() {
        let input = "```react\nno closing marker";
        let (display, artifact) = extract(input);

        assert!(artifact.is_none());
        assert_eq!(display, input.trim());
    }

    #[test]
    fn test_extract_label_is_trimmed() {
        let input = "```html (label:   Padded Label  )\n<i>x</i>\n```";
        let (_, artifact) = extract(input);
        assert_eq!(artifact.unwrap().label.as_deref(), Some("Padded Label"));
    }

    #[test]
    fn test_extract_empty_input() {
        let (display, artifact) = extract("");
        assert_eq!(display, "");
        assert!(artifact.is_none());
    }

    #[test]
    fn test_artifact_from_draft() {
        let draft = ArtifactDraft::new(ArtifactType::Html, Some("Snippet".into()), "<p/>".into());
        let artifact = Artifact::from_draft("art-1", draft);

        assert_eq!(artifact.id, "art-1");
        assert_eq!(artifact.artifact_type, ArtifactType::Html);
        assert_eq!(artifact.label.as_deref(), Some("Snippet"));
        assert!(artifact.is_loading.is_none());
        assert!(artifact.error.is_none());
    }

    #[test]
    fn test_artifact_type_serde_wire_names() {
        assert_eq!(serde_json::to_string(&ArtifactType::React).unwrap(), "\"react\"");
        assert_eq!(serde_json::to_string(&ArtifactType::Chart).unwrap(), "\"chart\"");
        let parsed: ArtifactType = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(parsed, ArtifactType::Markdown);
    }

    #[test]
    fn test_artifact_serde_roundtrip() {
        let artifact = Artifact {
            id: "a1".into(),
            artifact_type: ArtifactType::Chart,
            label: Some("Totals".into()),
            data: ArtifactData::Records(vec![Map::from_iter([(
                "k".to_string(),
                Value::from(1),
            )])]),
            is_loading: None,
            error: None,
        };

        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"type\":\"chart\""));
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }
}
