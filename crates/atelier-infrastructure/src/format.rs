//! Code formatting through an external CLI.
//!
//! Pipes source through a prettier-compatible command, choosing the
//! parser from the file extension. Unsupported file types short-circuit
//! to [`FormatOutcome::NotSupported`] without spawning anything.

use std::process::Stdio;

use async_trait::async_trait;
use atelier_core::project::{FileKind, ScriptDialect};
use atelier_core::services::{CodeFormatter, FormatOutcome};
use atelier_core::{AtelierError, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DEFAULT_FORMATTER: &str = "prettier";

pub struct CommandFormatter {
    program: String,
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_FORMATTER)
    }
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Parser for a file name, `None` when formatting is unsupported.
    fn parser_for(file_name: &str) -> Option<&'static str> {
        match FileKind::from_name(file_name) {
            FileKind::Script(ScriptDialect::Js | ScriptDialect::Jsx) => Some("babel"),
            FileKind::Script(ScriptDialect::Ts | ScriptDialect::Tsx) => Some("babel-ts"),
            FileKind::Stylesheet => Some("css"),
            FileKind::Html => Some("html"),
            FileKind::Markdown | FileKind::Json | FileKind::Other => None,
        }
    }
}

#[async_trait]
impl CodeFormatter for CommandFormatter {
    async fn format(&self, source: &str, file_name: &str) -> Result<FormatOutcome> {
        let Some(parser) = Self::parser_for(file_name) else {
            return Ok(FormatOutcome::NotSupported);
        };

        let mut child = Command::new(&self.program)
            .arg(format!("--parser={parser}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AtelierError::io(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .await
                .map_err(|e| AtelierError::io(format!("failed to write source: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AtelierError::io(format!("formatter did not finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AtelierError::Format(stderr.trim().to_string()));
        }

        Ok(FormatOutcome::Formatted(
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_table_covers_web_types() {
        assert_eq!(CommandFormatter::parser_for("a.js"), Some("babel"));
        assert_eq!(CommandFormatter::parser_for("a.tsx"), Some("babel-ts"));
        assert_eq!(CommandFormatter::parser_for("a.css"), Some("css"));
        assert_eq!(CommandFormatter::parser_for("a.html"), Some("html"));
    }

    #[test]
    fn unsupported_types_have_no_parser() {
        assert_eq!(CommandFormatter::parser_for("notes.md"), None);
        assert_eq!(CommandFormatter::parser_for("main.py"), None);
    }

    #[tokio::test]
    async fn unsupported_file_skips_the_command() {
        // A formatter program that cannot exist; unsupported types must
        // return before spawning it.
        let formatter = CommandFormatter::new("definitely-not-a-real-binary");
        let outcome = formatter.format("x = 1", "main.py").await.unwrap();
        assert_eq!(outcome, FormatOutcome::NotSupported);
    }
}
