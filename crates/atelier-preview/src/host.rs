//! Preview host: owns the live document, its console, and the bridge.

use atelier_core::{AtelierError, Result};
use atelier_core::project::ProjectState;

use crate::bridge::{
    BridgeMailbox, BridgeMessage, BridgeReceiver, ConsoleEntry, ConsoleLevel, ConsoleLog,
    bridge_channel,
};
use crate::pipeline::{BuildPipeline, PreviewDocument};

/// Hosts the current preview document and routes bridge traffic.
pub struct PreviewHost {
    pipeline: BuildPipeline,
    current: Option<PreviewDocument>,
    console: ConsoleLog,
    mailbox: BridgeMailbox,
    receiver: BridgeReceiver,
}

impl PreviewHost {
    pub fn new(pipeline: BuildPipeline) -> Self {
        let (mailbox, receiver) = bridge_channel();
        Self {
            pipeline,
            current: None,
            console: ConsoleLog::default(),
            mailbox,
            receiver,
        }
    }

    /// Rebuilds the preview from the given state.
    ///
    /// The console is cleared on every rebuild. A transpile failure is
    /// reported as a console error and the previous document stays up so
    /// the user keeps a working preview while fixing the code; other
    /// failures propagate.
    pub async fn rebuild(&mut self, state: &ProjectState) -> Result<()> {
        self.console.clear();
        match self.pipeline.build(state).await {
            Ok(document) => {
                self.current = Some(document);
                Ok(())
            }
            Err(AtelierError::Transpile(message)) => {
                tracing::warn!(error = %message, "preview build failed");
                self.console.push(ConsoleEntry::new(
                    ConsoleLevel::Error,
                    format!("Build failed: {message}"),
                ));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Drains bridge messages: console entries are appended in arrival
    /// order, nav targets are returned for the caller to resolve.
    pub fn pump(&mut self) -> Vec<String> {
        let mut nav_targets = Vec::new();
        for message in self.receiver.drain() {
            match message {
                BridgeMessage::Console { level, message } => {
                    self.console.push(ConsoleEntry::new(level, message));
                }
                BridgeMessage::Nav { file } => nav_targets.push(file),
            }
        }
        nav_targets
    }

    /// Mailbox for whatever embeds the preview frame.
    pub fn mailbox(&self) -> BridgeMailbox {
        self.mailbox.clone()
    }

    pub fn document(&self) -> Option<&PreviewDocument> {
        self.current.as_ref()
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    /// Drops the current document and console, for sandbox clears.
    pub fn reset(&mut self) {
        self.current = None;
        self.console.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atelier_core::project::ScriptDialect;
    use atelier_core::services::ScriptTranspiler;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fails on demand, so one host can see both outcomes.
    struct ToggleTranspiler {
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ScriptTranspiler for ToggleTranspiler {
        async fn transpile(&self, source: &str, _dialect: ScriptDialect) -> Result<String> {
            if self.fail.load(Ordering::SeqCst) {
                Err(AtelierError::Transpile("bad syntax".to_string()))
            } else {
                Ok(source.to_string())
            }
        }
    }

    fn host_with_toggle() -> (PreviewHost, Arc<AtomicBool>) {
        let fail = Arc::new(AtomicBool::new(false));
        let transpiler = ToggleTranspiler { fail: fail.clone() };
        (
            PreviewHost::new(BuildPipeline::new(Arc::new(transpiler))),
            fail,
        )
    }

    fn scripted_state() -> ProjectState {
        let mut state = ProjectState::default();
        state.create_file("index.html", "<p>hi</p>").unwrap();
        state.create_file("app.js", "console.log('hi');").unwrap();
        state
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_document() {
        let (mut host, fail) = host_with_toggle();
        let state = scripted_state();
        host.rebuild(&state).await.unwrap();
        let good_html = host.document().unwrap().html.clone();

        fail.store(true, Ordering::SeqCst);
        host.rebuild(&state).await.unwrap();
        assert_eq!(host.document().unwrap().html, good_html);
        let error = host.console().last_error().unwrap();
        assert!(error.message.contains("bad syntax"));
    }

    #[tokio::test]
    async fn rebuild_clears_console() {
        let (mut host, _) = host_with_toggle();
        let state = scripted_state();
        host.rebuild(&state).await.unwrap();
        host.mailbox().post(BridgeMessage::Console {
            level: ConsoleLevel::Log,
            message: "old output".to_string(),
        });
        host.pump();
        assert_eq!(host.console().entries().len(), 1);
        host.rebuild(&state).await.unwrap();
        assert!(host.console().entries().is_empty());
    }

    #[tokio::test]
    async fn pump_splits_console_from_nav() {
        let (mut host, _) = host_with_toggle();
        host.mailbox().post(BridgeMessage::Console {
            level: ConsoleLevel::Warn,
            message: "heads up".to_string(),
        });
        host.mailbox().post(BridgeMessage::Nav {
            file: "about.html".to_string(),
        });
        let nav = host.pump();
        assert_eq!(nav, vec!["about.html".to_string()]);
        assert_eq!(host.console().entries().len(), 1);
    }
}
