//! Script transpilation through an external CLI.
//!
//! Pipes source through an esbuild-compatible command. The command gets
//! the dialect as a `--loader` flag, reads the source on stdin, and
//! writes lowered JavaScript to stdout.

use std::process::Stdio;

use async_trait::async_trait;
use atelier_core::project::ScriptDialect;
use atelier_core::services::ScriptTranspiler;
use atelier_core::{AtelierError, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DEFAULT_TRANSPILER: &str = "esbuild";

pub struct CommandTranspiler {
    program: String,
}

impl Default for CommandTranspiler {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSPILER)
    }
}

impl CommandTranspiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ScriptTranspiler for CommandTranspiler {
    async fn transpile(&self, source: &str, dialect: ScriptDialect) -> Result<String> {
        let mut child = Command::new(&self.program)
            .arg(format!("--loader={}", dialect.as_str()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                // A missing binary is a build failure the preview console
                // should show, not a fatal IO error.
                if e.kind() == std::io::ErrorKind::NotFound {
                    AtelierError::Transpile(format!("{} not found on PATH", self.program))
                } else {
                    AtelierError::io(format!("failed to start {}: {e}", self.program))
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .await
                .map_err(|e| AtelierError::io(format!("failed to write source: {e}")))?;
            // Dropping stdin closes the pipe so the child sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AtelierError::io(format!("transpiler did not finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(dialect = dialect.as_str(), "transpilation failed");
            return Err(AtelierError::Transpile(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_a_transpile_error() {
        let transpiler = CommandTranspiler::new("definitely-not-a-real-transpiler");
        let err = transpiler
            .transpile("const x = 1;", ScriptDialect::Ts)
            .await
            .unwrap_err();
        match err {
            AtelierError::Transpile(message) => assert!(message.contains("not found")),
            other => panic!("expected Transpile error, got {other:?}"),
        }
    }
}
