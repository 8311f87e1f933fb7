//! Application layer: use cases wiring core, preview, and interaction.

pub mod chat_usecase;
pub mod context;
pub mod sandbox_usecase;

pub use chat_usecase::{ChatMode, ChatUseCase, RevealHandle, TurnOutcome};
pub use context::SessionContext;
pub use sandbox_usecase::SandboxUseCase;

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use atelier_core::Result;
    use atelier_core::project::ScriptDialect;
    use atelier_core::services::{
        ArchiveEntry, ArchiveWriter, CodeFormatter, FormatOutcome, ScriptTranspiler,
    };
    use atelier_core::session::{Session, SessionManager, SessionStore};
    use atelier_preview::{BuildPipeline, PreviewHost};

    use crate::sandbox_usecase::SandboxUseCase;

    #[derive(Default)]
    pub struct MemorySessionStore {
        sessions: Mutex<HashMap<String, Session>>,
        active: Mutex<Option<String>>,
    }

    #[async_trait]
    impl SessionStore for MemorySessionStore {
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

    pub struct IdentityTranspiler;

    #[async_trait]
    impl ScriptTranspiler for IdentityTranspiler {
        async fn transpile(&self, source: &str, _dialect: ScriptDialect) -> Result<String> {
            Ok(source.to_string())
        }
    }

    /// Uppercases supported sources so tests can see formatting happened.
    pub struct UppercaseFormatter;

    #[async_trait]
    impl CodeFormatter for UppercaseFormatter {
        async fn format(&self, source: &str, file_name: &str) -> Result<FormatOutcome> {
            if file_name.ends_with(".md") {
                return Ok(FormatOutcome::NotSupported);
            }
            Ok(FormatOutcome::Formatted(source.to_uppercase()))
        }
    }

    pub struct ConcatArchiver;

    impl ArchiveWriter for ConcatArchiver {
        fn write_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
            let mut bytes = Vec::new();
            for entry in entries {
                bytes.extend_from_slice(entry.name.as_bytes());
                bytes.push(b'\n');
                bytes.extend_from_slice(entry.content.as_bytes());
                bytes.push(b'\n');
            }
            Ok(bytes)
        }
    }

    pub async fn sandbox_usecase() -> Arc<SandboxUseCase> {
        let manager = Arc::new(SessionManager::new(Arc::new(MemorySessionStore::default())));
        let host = PreviewHost::new(BuildPipeline::new(Arc::new(IdentityTranspiler)));
        Arc::new(
            SandboxUseCase::start(
                manager,
                host,
                Arc::new(UppercaseFormatter),
                Arc::new(ConcatArchiver),
            )
            .await
            .unwrap(),
        )
    }
}
