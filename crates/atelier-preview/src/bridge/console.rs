//! In-memory console for the preview panel.

use super::message::ConsoleLevel;

/// One captured console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub message: String,
}

impl ConsoleEntry {
    pub fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Error entries carry a fix affordance; the exact message text is
    /// what gets fed back to the model.
    pub fn is_fixable(&self) -> bool {
        self.level == ConsoleLevel::Error
    }
}

/// Append-only log of console output for the current preview build.
#[derive(Debug, Default)]
pub struct ConsoleLog {
    entries: Vec<ConsoleEntry>,
}

impl ConsoleLog {
    pub fn push(&mut self, entry: ConsoleEntry) {
        self.entries.push(entry);
    }

    /// Cleared on every rebuild so stale output never outlives the code
    /// that produced it.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ConsoleEntry] {
        &self.entries
    }

    pub fn last_error(&self) -> Option<&ConsoleEntry> {
        self.entries.iter().rev().find(|e| e.is_fixable())
    }
}
