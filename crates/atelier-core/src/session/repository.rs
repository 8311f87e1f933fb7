//! Session store trait.
//!
//! Defines the narrow persistence contract: a key-value store of session
//! id to opaque serializable session blob, plus an active-session marker.
//! Implementations own structural migration of old blobs on load.

use anyhow::Result;
use async_trait::async_trait;

use super::model::Session;

/// An abstract store for session persistence.
///
/// Decouples core logic from the storage mechanism (JSON files, a
/// database, a remote API). Implementations must never hand back a
/// reference into live mutable state; every save receives a deep copy.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Finds a session by its ID. `Ok(None)` when absent.
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session snapshot.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Deletes a session. Succeeds when the session did not exist.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions.
    async fn list_all(&self) -> Result<Vec<Session>>;

    /// Gets the ID of the currently active session, if any.
    async fn get_active_session_id(&self) -> Result<Option<String>>;

    /// Marks a session as the active one.
    async fn set_active_session_id(&self, session_id: &str) -> Result<()>;

    /// Clears the active-session marker.
    async fn clear_active_session_id(&self) -> Result<()>;
}
