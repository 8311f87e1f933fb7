//! Session lifecycle management.

use std::sync::Arc;

use uuid::Uuid;

use super::model::Session;
use super::repository::SessionStore;
use crate::error::{AtelierError, Result};

/// Title given to a session before the first exchange names it.
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// Manages session lifecycle against a [`SessionStore`].
///
/// The manager never holds a live session itself; the host owns exactly
/// one live session at a time and passes copies in for persistence, so
/// no stale suspended operation can mutate a session that is no longer
/// displayed.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Creates, persists, and activates a new empty session.
    pub async fn create_session(&self) -> Result<Session> {
        let session = Session::new(Uuid::new_v4().to_string(), DEFAULT_SESSION_TITLE);
        self.store.save(&session).await?;
        self.store.set_active_session_id(&session.id).await?;
        Ok(session)
    }

    /// Persists a snapshot of the given session.
    pub async fn save_session(&self, session: &Session) -> Result<()> {
        self.store.save(session).await?;
        Ok(())
    }

    /// Restores the last active session, falling back to the most
    /// recently created one, if any exists.
    pub async fn restore_last_session(&self) -> Result<Option<Session>> {
        if let Some(id) = self.store.get_active_session_id().await? {
            if let Some(session) = self.store.find_by_id(&id).await? {
                return Ok(Some(session));
            }
        }
        let mut sessions = self.store.list_all().await?;
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions.into_iter().next())
    }

    /// Loads a session by id and marks it active.
    pub async fn switch_to(&self, session_id: &str) -> Result<Session> {
        let session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AtelierError::not_found("session", session_id))?;
        self.store.set_active_session_id(session_id).await?;
        Ok(session)
    }

    /// Deletes a session, clearing the active marker when it pointed at
    /// the deleted session.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.store.delete(session_id).await?;
        if self.store.get_active_session_id().await?.as_deref() == Some(session_id) {
            self.store.clear_active_session_id().await?;
        }
        Ok(())
    }

    /// Lists all sessions, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut sessions = self.store.list_all().await?;
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    /// Renames a stored session.
    pub async fn rename_session(&self, session_id: &str, new_title: &str) -> Result<()> {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Ok(());
        }
        let mut session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AtelierError::not_found("session", session_id))?;
        session.title = new_title.to_string();
        session.touch();
        self.store.save(&session).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSessionStore {
        sessions: Mutex<HashMap<String, Session>>,
        active: Mutex<Option<String>>,
    }

    #[async_trait]
    impl SessionStore for MockSessionStore {
        async fn find_by_id(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn save(&self, session: &Session) -> anyhow::Result<()> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().remove(session_id);
            Ok(())
        }

        async fn list_all(&self) -> anyhow::Result<Vec<Session>> {
            Ok(self.sessions.lock().unwrap().values().cloned().collect())
        }

        async fn get_active_session_id(&self) -> anyhow::Result<Option<String>> {
            Ok(self.active.lock().unwrap().clone())
        }

        async fn set_active_session_id(&self, session_id: &str) -> anyhow::Result<()> {
            *self.active.lock().unwrap() = Some(session_id.to_string());
            Ok(())
        }

        async fn clear_active_session_id(&self) -> anyhow::Result<()> {
            *self.active.lock().unwrap() = None;
            Ok(())
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MockSessionStore::default()))
    }

    #[tokio::test]
    async fn create_persists_and_activates() {
        let manager = manager();
        let session = manager.create_session().await.unwrap();
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
        let restored = manager.restore_last_session().await.unwrap().unwrap();
        assert_eq!(restored.id, session.id);
    }

    #[tokio::test]
    async fn switch_loads_and_marks_active() {
        let manager = manager();
        let first = manager.create_session().await.unwrap();
        let _second = manager.create_session().await.unwrap();
        let switched = manager.switch_to(&first.id).await.unwrap();
        assert_eq!(switched.id, first.id);
        let restored = manager.restore_last_session().await.unwrap().unwrap();
        assert_eq!(restored.id, first.id);
    }

    #[tokio::test]
    async fn delete_clears_active_marker() {
        let manager = manager();
        let session = manager.create_session().await.unwrap();
        manager.delete_session(&session.id).await.unwrap();
        assert!(manager.restore_last_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename_updates_title() {
        let manager = manager();
        let session = manager.create_session().await.unwrap();
        manager
            .rename_session(&session.id, "Todo app")
            .await
            .unwrap();
        let loaded = manager.switch_to(&session.id).await.unwrap();
        assert_eq!(loaded.title, "Todo app");
    }

    #[tokio::test]
    async fn switch_to_unknown_session_fails() {
        let manager = manager();
        let err = manager.switch_to("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
