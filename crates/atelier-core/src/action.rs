//! AI Action Protocol.
//!
//! Turns a model-proposed batch of file operations into safe mutations of
//! the project store. The operation set is deliberately tolerant of a
//! model's imperfect self-consistency: creating an existing file updates
//! it, updating a missing file creates it, and one invalid item never
//! blocks the rest of the batch.

use serde::{Deserialize, Serialize};

use crate::project::ProjectState;

/// The type of a proposed file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateFile,
    UpdateFile,
    DeleteFile,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateFile => "create_file",
            Self::UpdateFile => "update_file",
            Self::DeleteFile => "delete_file",
        }
    }
}

/// A single file operation proposed by the AI collaborator.
///
/// Transient: batches are applied and discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAction {
    #[serde(rename = "action_type")]
    pub kind: ActionKind,
    pub file_name: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl FileAction {
    pub fn create(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::CreateFile,
            file_name: file_name.into(),
            content: Some(content.into()),
        }
    }

    pub fn update(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::UpdateFile,
            file_name: file_name.into(),
            content: Some(content.into()),
        }
    }

    pub fn delete(file_name: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::DeleteFile,
            file_name: file_name.into(),
            content: None,
        }
    }
}

/// Where a batch came from; decides whether user gating applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOrigin {
    /// An explicit coding-mode exchange. Requires one accept/reject
    /// decision before any mutation.
    Coding,
    /// An automated fix-error loop. Gating bypassed by caller opt-in.
    FixLoop,
}

/// A batch held back until the user accepts or rejects it.
///
/// Rejecting discards the whole batch unapplied.
#[derive(Debug, Clone)]
pub struct StagedBatch {
    pub actions: Vec<FileAction>,
    pub origin: BatchOrigin,
}

impl StagedBatch {
    pub fn new(actions: Vec<FileAction>, origin: BatchOrigin) -> Self {
        Self { actions, origin }
    }

    /// One `(kind, file name)` row per item, for confirmation display.
    pub fn summary(&self) -> Vec<(ActionKind, &str)> {
        self.actions
            .iter()
            .map(|a| (a.kind, a.file_name.as_str()))
            .collect()
    }
}

/// An item the protocol skipped rather than applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAction {
    pub action: FileAction,
    pub reason: String,
}

/// Outcome of applying one batch.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// `(kind, file name)` of every item that mutated the store.
    pub applied: Vec<(ActionKind, String)>,
    pub skipped: Vec<SkippedAction>,
}

impl ApplyReport {
    pub fn mutated_anything(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applies a batch strictly in order.
///
/// Each item is fully applied (including activating the target and
/// snapshotting on creation) before the next begins, since later items
/// may depend on earlier ones. Never fails: invalid items are recorded
/// in the report with a warning instead.
///
/// The caller triggers the build pipeline exactly once after the whole
/// batch, not once per item.
pub fn apply_batch(state: &mut ProjectState, actions: &[FileAction]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for action in actions {
        if action.file_name.trim().is_empty() {
            skip(&mut report, action, "empty file name");
            continue;
        }
        match action.kind {
            ActionKind::CreateFile | ActionKind::UpdateFile => {
                let Some(content) = action.content.clone() else {
                    skip(&mut report, action, "missing content");
                    continue;
                };
                match state.find_by_name(&action.file_name) {
                    Some(existing) => {
                        // create_file on an existing name merges into an
                        // update rather than failing on the duplicate.
                        let id = existing.id.clone();
                        match state.file_mut(&id) {
                            Ok(file) => file.content = content,
                            Err(e) => {
                                skip(&mut report, action, &e.to_string());
                                continue;
                            }
                        }
                        if let Err(e) = state.set_active_file(Some(id)) {
                            skip(&mut report, action, &e.to_string());
                            continue;
                        }
                    }
                    None => {
                        let id = match state.create_file(&action.file_name, &content) {
                            Ok(id) => id,
                            Err(e) => {
                                skip(&mut report, action, &e.to_string());
                                continue;
                            }
                        };
                        if let Err(e) = state.snapshot_file(&id) {
                            skip(&mut report, action, &e.to_string());
                            continue;
                        }
                    }
                }
                report
                    .applied
                    .push((action.kind, action.file_name.clone()));
            }
            ActionKind::DeleteFile => match state.find_by_name(&action.file_name) {
                Some(file) => {
                    let id = file.id.clone();
                    match state.delete_file(&id) {
                        Ok(()) => report
                            .applied
                            .push((action.kind, action.file_name.clone())),
                        Err(e) => skip(&mut report, action, &e.to_string()),
                    }
                }
                None => skip(&mut report, action, "file does not exist"),
            },
        }
    }

    report
}

fn skip(report: &mut ApplyReport, action: &FileAction, reason: &str) {
    tracing::warn!(
        kind = action.kind.as_str(),
        file = action.file_name,
        reason,
        "skipped action item"
    );
    report.skipped.push(SkippedAction {
        action: action.clone(),
        reason: reason.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_delete_leaves_no_file() {
        let mut state = ProjectState::default();
        let batch = vec![
            FileAction::create("x.html", "<p>hi</p>"),
            FileAction::delete("x.html"),
        ];
        let report = apply_batch(&mut state, &batch);
        assert_eq!(report.applied.len(), 2);
        assert!(report.skipped.is_empty());
        assert!(state.find_by_name("x.html").is_none());
        assert!(state.check_invariants());
    }

    #[test]
    fn invalid_delete_does_not_block_other_items() {
        let mut state = ProjectState::default();
        let batch = vec![
            FileAction::create("a.js", "1"),
            FileAction::delete("ghost.js"),
            FileAction::create("b.js", "2"),
        ];
        let report = apply_batch(&mut state, &batch);
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, "file does not exist");
        assert!(state.find_by_name("a.js").is_some());
        assert!(state.find_by_name("b.js").is_some());
    }

    #[test]
    fn create_on_existing_name_updates_instead() {
        let mut state = ProjectState::default();
        apply_batch(&mut state, &[FileAction::create("a.js", "v1")]);
        let report = apply_batch(&mut state, &[FileAction::create("a.js", "v2")]);
        assert_eq!(report.applied.len(), 1);
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.find_by_name("a.js").unwrap().content, "v2");
    }

    #[test]
    fn update_on_missing_name_creates() {
        let mut state = ProjectState::default();
        apply_batch(&mut state, &[FileAction::update("new.css", "body{}")]);
        let file = state.find_by_name("new.css").unwrap();
        assert_eq!(file.content, "body{}");
        // Creation snapshots.
        assert_eq!(file.history.len(), 1);
    }

    #[test]
    fn missing_content_is_skipped() {
        let mut state = ProjectState::default();
        let action = FileAction {
            kind: ActionKind::CreateFile,
            file_name: "a.js".to_string(),
            content: None,
        };
        let report = apply_batch(&mut state, &[action]);
        assert!(report.applied.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn each_applied_item_activates_its_target() {
        let mut state = ProjectState::default();
        apply_batch(
            &mut state,
            &[
                FileAction::create("a.js", "1"),
                FileAction::update("b.js", "2"),
            ],
        );
        assert_eq!(state.active_file().unwrap().name, "b.js");
    }

    #[test]
    fn action_serde_uses_original_wire_names() {
        let json = r#"{"action_type":"create_file","file_name":"x.html","content":"<p/>"}"#;
        let action: FileAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind, ActionKind::CreateFile);
        assert_eq!(action.file_name, "x.html");
    }
}
