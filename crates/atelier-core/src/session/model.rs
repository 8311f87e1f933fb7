//! Session domain model.
//!
//! A session pairs one conversation with one sandbox project. It is the
//! "pure" domain model that business logic operates on, independent of
//! any specific storage format.

use serde::{Deserialize, Serialize};

use super::message::ConversationMessage;
use crate::project::ProjectState;

/// One human/AI collaboration session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format).
    pub id: String,
    /// Human-readable session title.
    pub title: String,
    /// Timestamp when the session was created (ISO 8601 format).
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format).
    pub updated_at: String,
    /// Ordered conversation history.
    #[serde(default)]
    pub conversation: Vec<ConversationMessage>,
    /// The sandbox project edited in this session.
    #[serde(default)]
    pub sandbox: ProjectState,
}

impl Session {
    /// Creates a new, empty session.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now.clone(),
            updated_at: now,
            conversation: Vec::new(),
            sandbox: ProjectState::default(),
        }
    }

    /// Bumps the updated-at timestamp to now.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
