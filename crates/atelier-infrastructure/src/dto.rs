//! Storage DTOs and structural migration.
//!
//! The on-disk JSON shape is decoupled from the domain model so old
//! files keep loading as the model evolves. Migration happens in the
//! DTO-to-domain conversion: missing fields get defaults, and files
//! written before version history existed get a seed snapshot so every
//! file always has at least its current content recorded.

use atelier_core::project::{ProjectFile, ProjectState, Snapshot};
use atelier_core::session::{ConversationMessage, Session};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub conversation: Vec<ConversationMessage>,
    #[serde(default)]
    pub sandbox: ProjectStateDto,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProjectStateDto {
    #[serde(default)]
    pub files: IndexMap<String, ProjectFileDto>,
    #[serde(default)]
    pub active_file_id: Option<String>,
    #[serde(default)]
    pub preview_target: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFileDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    /// Absent in files written before version history existed.
    #[serde(default)]
    pub history: Option<Vec<SnapshotDto>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotDto {
    pub timestamp: i64,
    pub content: String,
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            created_at: session.created_at.clone(),
            updated_at: session.updated_at.clone(),
            conversation: session.conversation.clone(),
            sandbox: ProjectStateDto {
                files: session
                    .sandbox
                    .files
                    .iter()
                    .map(|(id, file)| (id.clone(), ProjectFileDto::from(file)))
                    .collect(),
                active_file_id: session.sandbox.active_file_id.clone(),
                preview_target: Some(session.sandbox.preview_target.clone()),
            },
        }
    }
}

impl From<&ProjectFile> for ProjectFileDto {
    fn from(file: &ProjectFile) -> Self {
        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            content: file.content.clone(),
            history: Some(
                file.history
                    .iter()
                    .map(|s| SnapshotDto {
                        timestamp: s.timestamp,
                        content: s.content.clone(),
                    })
                    .collect(),
            ),
        }
    }
}

impl SessionDto {
    pub fn into_domain(self) -> Session {
        Session {
            id: self.id,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
            conversation: self.conversation,
            sandbox: self.sandbox.into_domain(),
        }
    }
}

impl ProjectStateDto {
    fn into_domain(self) -> ProjectState {
        let mut state = ProjectState::default();
        if let Some(target) = self.preview_target {
            state.preview_target = target;
        }
        state.files = self
            .files
            .into_iter()
            .map(|(id, file)| (id, file.into_domain()))
            .collect();
        // An active id pointing at a deleted file is dropped on load.
        state.active_file_id = self
            .active_file_id
            .filter(|id| state.files.contains_key(id));
        state
    }
}

impl ProjectFileDto {
    fn into_domain(self) -> ProjectFile {
        let history = match self.history {
            Some(history) => history
                .into_iter()
                .map(|s| Snapshot {
                    timestamp: s.timestamp,
                    content: s.content,
                })
                .collect(),
            // Pre-history file: seed with the current content so version
            // restore has something to show.
            None if !self.content.is_empty() => vec![Snapshot {
                timestamp: chrono::Utc::now().timestamp_millis(),
                content: self.content.clone(),
            }],
            None => Vec::new(),
        };
        ProjectFile {
            id: self.id,
            name: self.name,
            content: self.content,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_history_file_gets_seed_snapshot() {
        let json = r#"{
            "id": "s1", "title": "t", "created_at": "c", "updated_at": "u",
            "sandbox": {
                "files": {
                    "f1": { "id": "f1", "name": "index.html", "content": "<p/>" }
                },
                "active_file_id": "f1"
            }
        }"#;
        let dto: SessionDto = serde_json::from_str(json).unwrap();
        let session = dto.into_domain();
        let file = session.sandbox.file("f1").unwrap();
        assert_eq!(file.history.len(), 1);
        assert_eq!(file.history[0].content, "<p/>");
        assert_eq!(session.sandbox.preview_target, "index.html");
    }

    #[test]
    fn stale_active_id_is_dropped() {
        let json = r#"{
            "id": "s1", "title": "t", "created_at": "c", "updated_at": "u",
            "sandbox": { "files": {}, "active_file_id": "ghost" }
        }"#;
        let dto: SessionDto = serde_json::from_str(json).unwrap();
        let session = dto.into_domain();
        assert!(session.sandbox.active_file_id.is_none());
    }

    #[test]
    fn domain_round_trips_through_dto() {
        let mut session = Session::new("s1", "Title");
        let id = session.sandbox.create_file("a.js", "let x;").unwrap();
        session.sandbox.snapshot_file(&id).unwrap();
        session
            .conversation
            .push(ConversationMessage::user("hello"));
        let dto = SessionDto::from(&session);
        let text = serde_json::to_string(&dto).unwrap();
        let back: SessionDto = serde_json::from_str(&text).unwrap();
        assert_eq!(back.into_domain(), session);
    }
}
