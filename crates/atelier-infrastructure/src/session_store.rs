//! JSON-directory session store.
//!
//! One pretty-printed JSON file per session plus a plain-text marker for
//! the active session:
//!
//! ```text
//! base_dir/
//! ├── sessions/
//! │   ├── <session-id>.json
//! │   └── ...
//! └── active_session.txt
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use atelier_core::session::{Session, SessionStore};
use tokio::fs;

use crate::dto::SessionDto;
use crate::paths::AtelierPaths;

pub struct JsonDirSessionStore {
    sessions_dir: PathBuf,
    active_file: PathBuf,
}

impl JsonDirSessionStore {
    /// Opens the store at the default config location.
    pub async fn default_location() -> Result<Self> {
        Self::new(AtelierPaths::config_dir()?).await
    }

    /// Opens the store under `base_dir`, creating directories as needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let sessions_dir = base_dir.join("sessions");
        fs::create_dir_all(&sessions_dir)
            .await
            .context("failed to create sessions directory")?;
        Ok(Self {
            sessions_dir,
            active_file: base_dir.join("active_session.txt"),
        })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{session_id}.json"))
    }
}

#[async_trait]
impl SessionStore for JsonDirSessionStore {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let path = self.session_path(session_id);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("failed to read session file"),
        };
        let dto: SessionDto = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse session file {}", path.display()))?;
        Ok(Some(dto.into_domain()))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let dto = SessionDto::from(session);
        let text = serde_json::to_string_pretty(&dto).context("failed to serialize session")?;
        fs::write(self.session_path(&session.id), text)
            .await
            .context("failed to write session file")?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        match fs::remove_file(self.session_path(session_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to delete session file"),
        }
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(&self.sessions_dir)
            .await
            .context("failed to read sessions directory")?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = match fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable session file");
                    continue;
                }
            };
            // One corrupt file must not take down the whole list.
            match serde_json::from_str::<SessionDto>(&text) {
                Ok(dto) => sessions.push(dto.into_domain()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparsable session file");
                }
            }
        }
        Ok(sessions)
    }

    async fn get_active_session_id(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.active_file).await {
            Ok(text) => {
                let id = text.trim().to_string();
                Ok(if id.is_empty() { None } else { Some(id) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("failed to read active session marker"),
        }
    }

    async fn set_active_session_id(&self, session_id: &str) -> Result<()> {
        fs::write(&self.active_file, session_id)
            .await
            .context("failed to write active session marker")?;
        Ok(())
    }

    async fn clear_active_session_id(&self) -> Result<()> {
        match fs::remove_file(&self.active_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to clear active session marker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (JsonDirSessionStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = JsonDirSessionStore::new(dir.path()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn save_and_reload_preserves_sandbox() {
        let (store, _dir) = store().await;
        let mut session = Session::new("s1", "Test");
        let id = session.sandbox.create_file("index.html", "<p/>").unwrap();
        session.sandbox.snapshot_file(&id).unwrap();
        store.save(&session).await.unwrap();

        let loaded = store.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let (store, _dir) = store().await;
        assert!(store.find_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_skipped_in_list() {
        let (store, dir) = store().await;
        store.save(&Session::new("good", "ok")).await.unwrap();
        std::fs::write(dir.path().join("sessions/bad.json"), "{not json").unwrap();
        let sessions = store.list_all().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "good");
    }

    #[tokio::test]
    async fn active_marker_round_trips() {
        let (store, _dir) = store().await;
        assert!(store.get_active_session_id().await.unwrap().is_none());
        store.set_active_session_id("s1").await.unwrap();
        assert_eq!(
            store.get_active_session_id().await.unwrap().as_deref(),
            Some("s1")
        );
        store.clear_active_session_id().await.unwrap();
        assert!(store.get_active_session_id().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (store, _dir) = store().await;
        store.save(&Session::new("s1", "t")).await.unwrap();
        store.delete("s1").await.unwrap();
        store.delete("s1").await.unwrap();
        assert!(store.find_by_id("s1").await.unwrap().is_none());
    }
}
