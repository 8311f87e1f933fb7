//! Version History Manager.
//!
//! History is append-only and monotonic in time: any past state stays
//! recoverable after further edits. Snapshots are explicit user/AI
//! events, not per-keystroke, so growth is slow; it is still bounded at
//! [`HISTORY_CAP`] entries per file, oldest dropped first.

use chrono::Utc;

use super::model::{ProjectState, Snapshot};
use crate::error::{AtelierError, Result};

/// Maximum number of snapshots kept per file.
pub const HISTORY_CAP: usize = 100;

/// Result of a snapshot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// A new history entry was appended.
    Saved,
    /// Content matched the newest snapshot; nothing was recorded.
    Unchanged,
}

/// Timestamps within one file are strictly ascending, so two snapshots
/// taken within the same millisecond stay distinguishable.
fn next_timestamp(newest: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match newest {
        Some(last) if now <= last => last + 1,
        _ => now,
    }
}

impl ProjectState {
    /// Records the file's current content as a new snapshot.
    ///
    /// A no-op reporting [`SnapshotOutcome::Unchanged`] when the content
    /// equals the newest snapshot, which keeps repeated saves of the same
    /// content from growing history.
    pub fn snapshot_file(&mut self, id: &str) -> Result<SnapshotOutcome> {
        let file = self.file_mut(id)?;
        if file
            .history
            .last()
            .is_some_and(|s| s.content == file.content)
        {
            return Ok(SnapshotOutcome::Unchanged);
        }
        let timestamp = next_timestamp(file.history.last().map(|s| s.timestamp));
        if file.history.len() >= HISTORY_CAP {
            file.history.remove(0);
        }
        file.history.push(Snapshot {
            timestamp,
            content: file.content.clone(),
        });
        tracing::debug!(file = file.name, timestamp, "saved snapshot");
        Ok(SnapshotOutcome::Saved)
    }

    /// Newest-first view over a file's history. Does not mutate.
    pub fn list_versions(&self, id: &str) -> Result<Vec<Snapshot>> {
        let file = self.file(id)?;
        Ok(file.history.iter().rev().cloned().collect())
    }

    /// Restores a file's content to the snapshot at `timestamp`, then
    /// immediately snapshots again so the restore itself is a recorded,
    /// reversible event. Snapshots newer than `timestamp` are preserved.
    pub fn restore_version(&mut self, id: &str, timestamp: i64) -> Result<()> {
        let restored = {
            let file = self.file_mut(id)?;
            let snapshot = file
                .history
                .iter()
                .find(|s| s.timestamp == timestamp)
                .ok_or_else(|| AtelierError::version_not_found(&file.name, timestamp))?;
            let content = snapshot.content.clone();
            file.content = content;
            file.name.clone()
        };
        self.snapshot_file(id)?;
        tracing::debug!(file = restored, timestamp, "restored snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_file(content: &str) -> (ProjectState, String) {
        let mut state = ProjectState::default();
        let id = state.create_file("main.js", content).unwrap();
        (state, id)
    }

    #[test]
    fn snapshot_twice_without_change_is_a_noop() {
        let (mut state, id) = one_file("let x = 1;");
        assert_eq!(state.snapshot_file(&id).unwrap(), SnapshotOutcome::Saved);
        assert_eq!(
            state.snapshot_file(&id).unwrap(),
            SnapshotOutcome::Unchanged
        );
        assert_eq!(state.file(&id).unwrap().history.len(), 1);
    }

    #[test]
    fn snapshot_records_changed_content() {
        let (mut state, id) = one_file("v1");
        state.snapshot_file(&id).unwrap();
        state.file_mut(&id).unwrap().content = "v2".to_string();
        assert_eq!(state.snapshot_file(&id).unwrap(), SnapshotOutcome::Saved);
        let history = &state.file(&id).unwrap().history;
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp < history[1].timestamp);
    }

    #[test]
    fn restore_appends_and_keeps_newer_entries() {
        let (mut state, id) = one_file("v1");
        state.snapshot_file(&id).unwrap();
        let t1 = state.file(&id).unwrap().history[0].timestamp;
        state.file_mut(&id).unwrap().content = "v2".to_string();
        state.snapshot_file(&id).unwrap();

        state.restore_version(&id, t1).unwrap();

        let versions = state.list_versions(&id).unwrap();
        assert_eq!(versions.len(), 3);
        // Newest-first: the restore snapshot leads and matches v1.
        assert_eq!(versions[0].content, "v1");
        assert!(versions[0].timestamp > versions[1].timestamp);
        // The v2 snapshot taken after t1 is still present.
        assert!(versions.iter().any(|s| s.content == "v2"));
        assert_eq!(state.file(&id).unwrap().content, "v1");
    }

    #[test]
    fn restore_unknown_timestamp_fails_and_leaves_state() {
        let (mut state, id) = one_file("v1");
        state.snapshot_file(&id).unwrap();
        let err = state.restore_version(&id, 42).unwrap_err();
        assert!(matches!(err, AtelierError::VersionNotFound { .. }));
        assert_eq!(state.file(&id).unwrap().history.len(), 1);
        assert_eq!(state.file(&id).unwrap().content, "v1");
    }

    #[test]
    fn history_is_capped() {
        let (mut state, id) = one_file("");
        for i in 0..(HISTORY_CAP + 5) {
            state.file_mut(&id).unwrap().content = format!("v{i}");
            state.snapshot_file(&id).unwrap();
        }
        let history = &state.file(&id).unwrap().history;
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.last().unwrap().content, format!("v{}", HISTORY_CAP + 4));
    }
}
