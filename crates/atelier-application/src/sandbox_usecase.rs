//! Sandbox use cases: file operations, history, staged batches, preview.
//!
//! Every mutation persists the session and rebuilds the preview, so the
//! stored state and the visible document never drift from the file
//! table.

use std::sync::Arc;

use atelier_core::action::{ApplyReport, FileAction, StagedBatch, apply_batch};
use atelier_core::project::{DEFAULT_PREVIEW_TARGET, Snapshot, SnapshotOutcome};
use atelier_core::services::{ArchiveEntry, ArchiveWriter, CodeFormatter, FormatOutcome};
use atelier_core::session::{Session, SessionManager};
use atelier_core::{AtelierError, Result};
use atelier_preview::PreviewHost;
use tokio::sync::{Mutex, RwLock};

use crate::context::SessionContext;

pub struct SandboxUseCase {
    ctx: Arc<RwLock<SessionContext>>,
    host: Arc<Mutex<PreviewHost>>,
    sessions: Arc<SessionManager>,
    formatter: Arc<dyn CodeFormatter>,
    archiver: Arc<dyn ArchiveWriter>,
}

impl SandboxUseCase {
    /// Restores the last active session, creating a fresh one when none
    /// exists, and builds its initial preview.
    pub async fn start(
        sessions: Arc<SessionManager>,
        host: PreviewHost,
        formatter: Arc<dyn CodeFormatter>,
        archiver: Arc<dyn ArchiveWriter>,
    ) -> Result<Self> {
        let session = match sessions.restore_last_session().await? {
            Some(session) => session,
            None => sessions.create_session().await?,
        };
        let usecase = Self {
            ctx: Arc::new(RwLock::new(SessionContext::new(session))),
            host: Arc::new(Mutex::new(host)),
            sessions,
            formatter,
            archiver,
        };
        usecase.rebuild_preview().await?;
        Ok(usecase)
    }

    /// Shared live-session context, for the chat use case.
    pub fn context(&self) -> Arc<RwLock<SessionContext>> {
        self.ctx.clone()
    }

    pub fn host(&self) -> Arc<Mutex<PreviewHost>> {
        self.host.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.ctx.read().await.generation
    }

    /// A point-in-time copy of the live session.
    pub async fn session_snapshot(&self) -> Session {
        self.ctx.read().await.session.clone()
    }

    // --- file operations ---

    pub async fn create_file(&self, name: &str, content: &str) -> Result<String> {
        let id = {
            let mut ctx = self.ctx.write().await;
            let id = ctx.session.sandbox.create_file(name, content)?;
            ctx.session.sandbox.snapshot_file(&id)?;
            id
        };
        self.persist().await?;
        self.rebuild_preview().await?;
        Ok(id)
    }

    pub async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<()> {
        self.ctx
            .write()
            .await
            .session
            .sandbox
            .rename_file(file_id, new_name)?;
        self.persist().await?;
        self.rebuild_preview().await
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.ctx.write().await.session.sandbox.delete_file(file_id)?;
        self.persist().await?;
        self.rebuild_preview().await
    }

    pub async fn set_active_file(&self, file_id: Option<String>) -> Result<()> {
        self.ctx.write().await.session.sandbox.set_active_file(file_id)?;
        self.persist().await
    }

    /// Live editor keystrokes: updates content without snapshotting.
    pub async fn edit_active_content(&self, content: &str) -> Result<()> {
        self.ctx.write().await.session.sandbox.edit_active_content(content)?;
        self.persist().await?;
        self.rebuild_preview().await
    }

    pub async fn clear_sandbox(&self) -> Result<()> {
        {
            let mut ctx = self.ctx.write().await;
            ctx.session.sandbox.clear();
            ctx.staged = None;
        }
        self.host.lock().await.reset();
        self.persist().await
    }

    // --- version history ---

    pub async fn save_snapshot(&self, file_id: &str) -> Result<SnapshotOutcome> {
        let outcome = self.ctx.write().await.session.sandbox.snapshot_file(file_id)?;
        if outcome == SnapshotOutcome::Saved {
            self.persist().await?;
        }
        Ok(outcome)
    }

    pub async fn list_versions(&self, file_id: &str) -> Result<Vec<Snapshot>> {
        self.ctx.read().await.session.sandbox.list_versions(file_id)
    }

    pub async fn restore_version(&self, file_id: &str, timestamp: i64) -> Result<()> {
        self.ctx
            .write()
            .await
            .session
            .sandbox
            .restore_version(file_id, timestamp)?;
        self.persist().await?;
        self.rebuild_preview().await
    }

    // --- staged batches ---

    /// Holds a batch for the user's accept/reject decision. A new batch
    /// replaces any batch still pending.
    pub async fn stage_batch(&self, batch: StagedBatch) {
        let mut ctx = self.ctx.write().await;
        if ctx.staged.is_some() {
            tracing::warn!("replacing pending staged batch");
        }
        ctx.staged = Some(batch);
    }

    pub async fn staged_batch(&self) -> Option<StagedBatch> {
        self.ctx.read().await.staged.clone()
    }

    /// Applies the pending batch. One persist and one rebuild for the
    /// whole batch, not per item.
    pub async fn accept_staged(&self) -> Result<ApplyReport> {
        let report = {
            let mut ctx = self.ctx.write().await;
            let Some(batch) = ctx.staged.take() else {
                return Err(AtelierError::internal("no staged batch to accept"));
            };
            apply_batch(&mut ctx.session.sandbox, &batch.actions)
        };
        if report.mutated_anything() {
            self.persist().await?;
            self.rebuild_preview().await?;
        }
        Ok(report)
    }

    /// Discards the pending batch unapplied. Returns whether one existed.
    pub async fn reject_staged(&self) -> bool {
        self.ctx.write().await.staged.take().is_some()
    }

    /// Applies a batch immediately, bypassing staging. Only the fix-error
    /// loop calls this, by explicit opt-in.
    pub async fn apply_batch_now(&self, actions: &[FileAction]) -> Result<ApplyReport> {
        let report = {
            let mut ctx = self.ctx.write().await;
            apply_batch(&mut ctx.session.sandbox, actions)
        };
        if report.mutated_anything() {
            self.persist().await?;
            self.rebuild_preview().await?;
        }
        Ok(report)
    }

    // --- preview ---

    pub async fn rebuild_preview(&self) -> Result<()> {
        let ctx = self.ctx.read().await;
        self.host.lock().await.rebuild(&ctx.session.sandbox).await
    }

    /// Drains bridge traffic. Navigation retargets the preview to the
    /// named file when it exists, falling back to the default entry, and
    /// rebuilds once for the batch.
    pub async fn pump_bridge(&self) -> Result<()> {
        let nav_targets = self.host.lock().await.pump();
        if nav_targets.is_empty() {
            return Ok(());
        }
        {
            let mut ctx = self.ctx.write().await;
            for target in nav_targets {
                let resolved = if ctx.session.sandbox.find_by_name(&target).is_some() {
                    target
                } else {
                    tracing::debug!(target, "nav to unknown file, using default entry");
                    DEFAULT_PREVIEW_TARGET.to_string()
                };
                ctx.session.sandbox.preview_target = resolved;
            }
        }
        self.persist().await?;
        self.rebuild_preview().await
    }

    // --- formatting and export ---

    /// Formats the active file. Unsupported file types are a benign
    /// no-op; a successful format snapshots the previous content.
    pub async fn format_active_file(&self) -> Result<FormatOutcome> {
        let (id, name, content) = {
            let ctx = self.ctx.read().await;
            let Some(file) = ctx.session.sandbox.active_file() else {
                return Ok(FormatOutcome::NotSupported);
            };
            (file.id.clone(), file.name.clone(), file.content.clone())
        };

        let outcome = self.formatter.format(&content, &name).await?;
        if let FormatOutcome::Formatted(formatted) = &outcome {
            let mut ctx = self.ctx.write().await;
            // Snapshot first so the pre-format content stays restorable.
            ctx.session.sandbox.snapshot_file(&id)?;
            ctx.session.sandbox.file_mut(&id)?.content = formatted.clone();
            ctx.session.sandbox.snapshot_file(&id)?;
            drop(ctx);
            self.persist().await?;
            self.rebuild_preview().await?;
        }
        Ok(outcome)
    }

    /// Bundles every project file into an archive, in file order.
    pub async fn export_archive(&self) -> Result<Vec<u8>> {
        let entries: Vec<ArchiveEntry> = {
            let ctx = self.ctx.read().await;
            ctx.session
                .sandbox
                .files
                .values()
                .map(|f| ArchiveEntry::new(f.name.clone(), f.content.clone()))
                .collect()
        };
        self.archiver.write_archive(&entries)
    }

    // --- session lifecycle ---

    /// Persists the live session.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = {
            let mut ctx = self.ctx.write().await;
            ctx.session.touch();
            ctx.session.clone()
        };
        self.sessions.save_session(&snapshot).await
    }

    pub async fn create_session(&self) -> Result<()> {
        self.persist().await?;
        let session = self.sessions.create_session().await?;
        self.ctx.write().await.replace_session(session);
        self.rebuild_preview().await
    }

    pub async fn switch_session(&self, session_id: &str) -> Result<()> {
        self.persist().await?;
        let session = self.sessions.switch_to(session_id).await?;
        self.ctx.write().await.replace_session(session);
        self.rebuild_preview().await
    }

    /// Deletes a session. Deleting the live one swaps in a fresh session.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let is_current = self.ctx.read().await.session.id == session_id;
        self.sessions.delete_session(session_id).await?;
        if is_current {
            let session = self.sessions.create_session().await?;
            self.ctx.write().await.replace_session(session);
            self.rebuild_preview().await?;
        }
        Ok(())
    }

    pub async fn rename_session(&self, session_id: &str, new_title: &str) -> Result<()> {
        self.sessions.rename_session(session_id, new_title).await?;
        let mut ctx = self.ctx.write().await;
        if ctx.session.id == session_id {
            let trimmed = new_title.trim();
            if !trimmed.is_empty() {
                ctx.session.title = trimmed.to_string();
            }
        }
        Ok(())
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.sessions.list_sessions().await
    }
}
