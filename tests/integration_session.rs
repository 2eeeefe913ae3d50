//! End-to-end tests for the send pipeline, branching, and snapshot
//! persistence, driven through the public library API with a scripted
//! generator standing in for the network.

use async_trait::async_trait;
use atelier::artifact::{extract, ArtifactType};
use atelier::error::Result;
use atelier::localization::Language;
use atelier::providers::{GeneratedResponse, Generator, HistoryTurn, InputMode};
use atelier::session::ChatSession;
use atelier::store::SnapshotStore;
use std::sync::Mutex;
use tempfile::tempdir;

/// Generator that runs canned raw model output through the real artifact
/// extractor, mimicking what the chat path of a live provider does.
struct CannedGenerator {
    raw_outputs: Mutex<Vec<String>>,
}

impl CannedGenerator {
    fn new(raw_outputs: &[&str]) -> Self {
        Self {
            raw_outputs: Mutex::new(raw_outputs.iter().map(|s| s.to_string()).collect()),
        }
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _history: &[HistoryTurn],
        _images: &[String],
        _mode: InputMode,
        _language: Language,
    ) -> Result<GeneratedResponse> {
        let mut outputs = self.raw_outputs.lock().unwrap();
        let raw = if outputs.is_empty() {
            "ok".to_string()
        } else {
            outputs.remove(0)
        };
        let (text, artifact) = extract(&raw);
        Ok(GeneratedResponse {
            text,
            sources: Vec::new(),
            artifact,
        })
    }
}

#[tokio::test]
async fn full_turn_records_extracted_artifact() {
    let generator = CannedGenerator::new(&[
        "Sure. ```react (label: Counter)\nexport const C = () => null;\n```",
    ]);
    let mut session = ChatSession::new(Box::new(generator), Language::En);

    let reply = session
        .send("build a counter", Vec::new(), InputMode::Chat)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(reply.content, "Sure.");

    let conversation = session.store().active_conversation().unwrap();
    assert_eq!(conversation.artifacts.len(), 1);
    let artifact = &conversation.artifacts[0];
    assert_eq!(artifact.artifact_type, ArtifactType::React);
    assert_eq!(artifact.label.as_deref(), Some("Counter"));
    assert_eq!(reply.artifact_id.as_deref(), Some(artifact.id.as_str()));
}

#[tokio::test]
async fn invalid_chart_json_degrades_to_text_artifact() {
    let generator = CannedGenerator::new(&["```json-chart\n{oops}\n```"]);
    let mut session = ChatSession::new(Box::new(generator), Language::En);

    let reply = session
        .send("chart please", Vec::new(), InputMode::Chat)
        .await
        .unwrap()
        .unwrap();

    // The fence stays in the message text on the failure path.
    assert!(reply.content.contains("```json-chart"));

    let conversation = session.store().active_conversation().unwrap();
    assert_eq!(conversation.artifacts.len(), 1);
    assert_eq!(conversation.artifacts[0].artifact_type, ArtifactType::Text);
    assert!(conversation.artifacts[0]
        .data
        .as_text()
        .unwrap()
        .contains("Invalid JSON"));
}

#[tokio::test]
async fn branch_then_diverge_keeps_conversations_independent() {
    let generator = CannedGenerator::new(&[
        "answer one",
        "answer two",
        "```html\n<p>branch artifact</p>\n```",
    ]);
    let mut session = ChatSession::new(Box::new(generator), Language::En);

    session
        .send("question one", Vec::new(), InputMode::Chat)
        .await
        .unwrap();
    session
        .send("question two", Vec::new(), InputMode::Chat)
        .await
        .unwrap();

    let source_id = session.store().active_id().unwrap().to_string();
    let edited = session.store().active_conversation().unwrap().messages[2].clone();
    assert_eq!(edited.content, "question two");

    session
        .edit_and_branch(&edited.id, "question two, revised")
        .await
        .unwrap()
        .unwrap();

    let branch = session.store().active_conversation().unwrap().clone();
    let source = session.store().get(&source_id).unwrap().clone();

    // The branch holds the strict prefix plus the resubmitted turn.
    assert_eq!(branch.messages.len(), 4);
    assert_eq!(branch.messages[0].content, "question one");
    assert_eq!(branch.messages[2].content, "question two, revised");
    assert_eq!(branch.branched_from.as_deref(), Some(source.id.as_str()));
    assert!(branch.title.starts_with("Branch: "));

    // The source still carries the original turn; artifacts diverged.
    assert_eq!(source.messages[2].content, "question two");
    assert_eq!(branch.artifacts.len(), 1);
    assert!(source.artifacts.is_empty());
}

#[tokio::test]
async fn snapshot_roundtrip_preserves_collection_exactly() {
    let dir = tempdir().unwrap();
    let snapshot = SnapshotStore::new(dir.path().join("snapshot")).unwrap();

    let generator = CannedGenerator::new(&[
        "plain answer",
        "```markdown (label: Doc)\n# hi\n```",
    ]);
    let mut session = ChatSession::new(Box::new(generator), Language::En);
    session
        .send("first", Vec::new(), InputMode::Chat)
        .await
        .unwrap();
    session
        .send("second", Vec::new(), InputMode::Chat)
        .await
        .unwrap();

    let state = session.snapshot_state();
    snapshot.save(&state).unwrap();

    let loaded = snapshot.load();
    assert_eq!(loaded, state);

    // A restored session picks up exactly where the first one left off.
    let mut restored = ChatSession::new(Box::new(CannedGenerator::new(&[])), Language::Ja);
    restored.restore(loaded);
    assert_eq!(restored.language(), Language::En);
    assert_eq!(
        restored.store().active_id(),
        session.store().active_id()
    );
    assert_eq!(
        restored.store().active_conversation().unwrap().messages.len(),
        4
    );
}

#[tokio::test]
async fn corrupt_snapshot_loads_as_empty_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot");

    {
        let snapshot = SnapshotStore::new(&path).unwrap();
        let generator = CannedGenerator::new(&["answer"]);
        let mut session = ChatSession::new(Box::new(generator), Language::En);
        session
            .send("hello", Vec::new(), InputMode::Chat)
            .await
            .unwrap();
        snapshot.save(&session.snapshot_state()).unwrap();
    }

    // Clobber the stored values with bytes that are not JSON.
    {
        let db = sled::open(&path).unwrap();
        db.insert("conversations", &b"{definitely not json"[..]).unwrap();
        db.insert("active_conversation_id", &b"\x00\x01"[..]).unwrap();
        db.flush().unwrap();
    }

    // The loader falls back to the empty state rather than erroring.
    let snapshot = SnapshotStore::new(&path).unwrap();
    let loaded = snapshot.load();
    assert!(loaded.conversations.is_empty());
    assert!(loaded.active_conversation_id.is_none());
    // The untouched language key still loads.
    assert_eq!(loaded.language, Language::En);
}
