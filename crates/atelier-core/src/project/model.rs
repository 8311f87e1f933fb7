//! Project domain model.
//!
//! A project is the set of files edited in one sandbox session. Files are
//! kept in an insertion-ordered table so that iteration (and therefore
//! preview assembly and active-file fallback) is deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Entry file used when the preview target does not exist.
pub const DEFAULT_PREVIEW_TARGET: &str = "index.html";

/// An immutable, timestamped copy of one file's content.
///
/// Timestamps are unix milliseconds and strictly ascending within one
/// file's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: i64,
    pub content: String,
}

/// A single file in the sandbox project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Opaque unique identifier, stable for the file's lifetime.
    pub id: String,
    /// Path-like name, unique within a project (case-sensitive).
    pub name: String,
    /// Current UTF-8 text content.
    pub content: String,
    /// Append-only snapshot history, ordered by timestamp ascending.
    /// Empty means the file was never snapshotted.
    #[serde(default)]
    pub history: Vec<Snapshot>,
}

impl ProjectFile {
    /// Returns the file kind derived from the name's extension.
    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }
}

/// The in-memory state of one sandbox project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    /// File table keyed by file id. Iteration order is insertion order.
    #[serde(default)]
    pub files: IndexMap<String, ProjectFile>,
    /// The file currently focused for editing. Always `None` or a key
    /// present in `files`.
    #[serde(default)]
    pub active_file_id: Option<String>,
    /// Name of the preview entry file. Not required to currently exist.
    #[serde(default = "default_preview_target")]
    pub preview_target: String,
}

fn default_preview_target() -> String {
    DEFAULT_PREVIEW_TARGET.to_string()
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            files: IndexMap::new(),
            active_file_id: None,
            preview_target: default_preview_target(),
        }
    }
}

/// Script dialect hint handed to the transpilation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    Js,
    Jsx,
    Ts,
    /// The richest supported dialect; a superset of the others, so the
    /// concatenated script body is always transpiled as TSX.
    Tsx,
}

impl ScriptDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Jsx => "jsx",
            Self::Ts => "ts",
            Self::Tsx => "tsx",
        }
    }
}

/// File classification derived from the name's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Html,
    Stylesheet,
    Script(ScriptDialect),
    Markdown,
    Json,
    Other,
}

impl FileKind {
    /// Classifies a file by its extension (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Stylesheet,
            "js" => Self::Script(ScriptDialect::Js),
            "jsx" => Self::Script(ScriptDialect::Jsx),
            "ts" => Self::Script(ScriptDialect::Ts),
            "tsx" => Self::Script(ScriptDialect::Tsx),
            "md" => Self::Markdown,
            "json" => Self::Json,
            _ => Self::Other,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script(_))
    }

    pub fn is_stylesheet(&self) -> bool {
        matches!(self, Self::Stylesheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kind_from_extension() {
        assert_eq!(FileKind::from_name("index.html"), FileKind::Html);
        assert_eq!(FileKind::from_name("style.css"), FileKind::Stylesheet);
        assert_eq!(
            FileKind::from_name("app.tsx"),
            FileKind::Script(ScriptDialect::Tsx)
        );
        assert_eq!(
            FileKind::from_name("MAIN.JS"),
            FileKind::Script(ScriptDialect::Js)
        );
        assert_eq!(FileKind::from_name("README"), FileKind::Other);
        assert_eq!(FileKind::from_name("notes.md"), FileKind::Markdown);
    }

    #[test]
    fn default_state_targets_index_html() {
        let state = ProjectState::default();
        assert_eq!(state.preview_target, DEFAULT_PREVIEW_TARGET);
        assert!(state.files.is_empty());
        assert!(state.active_file_id.is_none());
    }
}
