//! Service traits for capabilities provided outside the core.
//!
//! Transpilation, formatting, and archiving are external tools from the
//! core's point of view. The traits here keep the domain logic testable
//! with in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::project::ScriptDialect;

/// Lowers JSX/TSX source to plain browser-executable JavaScript.
#[async_trait]
pub trait ScriptTranspiler: Send + Sync {
    async fn transpile(&self, source: &str, dialect: ScriptDialect) -> Result<String>;
}

/// Result of asking the formatter to reformat a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The formatted source text.
    Formatted(String),
    /// No formatter is registered for this file type. Not an error; the
    /// caller reports it and leaves the file untouched.
    NotSupported,
}

/// Pretty-prints source code by file type.
#[async_trait]
pub trait CodeFormatter: Send + Sync {
    async fn format(&self, source: &str, file_name: &str) -> Result<FormatOutcome>;
}

/// One file to place in an exported archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: String,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Bundles project files into a downloadable archive.
pub trait ArchiveWriter: Send + Sync {
    fn write_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>>;
}
