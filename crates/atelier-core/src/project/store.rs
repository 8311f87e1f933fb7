//! Virtual Project Store operations.
//!
//! All file creation, renaming and deletion goes through these methods;
//! nothing outside this module mutates the file table directly. The
//! invariants maintained after every mutation:
//!
//! - file names are unique (case-sensitive exact match)
//! - `active_file_id` is always `None` or a key present in `files`

use uuid::Uuid;

use super::model::{ProjectFile, ProjectState};
use crate::error::{AtelierError, Result};

impl ProjectState {
    /// Creates a new file and makes it active.
    ///
    /// Fails with [`AtelierError::DuplicateName`] if a file with the same
    /// name already exists. The new file starts with an empty history.
    pub fn create_file(&mut self, name: &str, content: &str) -> Result<String> {
        if self.find_by_name(name).is_some() {
            return Err(AtelierError::duplicate_name(name));
        }
        let id = Uuid::new_v4().to_string();
        self.files.insert(
            id.clone(),
            ProjectFile {
                id: id.clone(),
                name: name.to_string(),
                content: content.to_string(),
                history: Vec::new(),
            },
        );
        self.active_file_id = Some(id.clone());
        tracing::debug!(file = name, "created project file");
        Ok(id)
    }

    /// Renames a file.
    ///
    /// No-ops when the new name is blank or equals the current name.
    /// Fails with [`AtelierError::NotFound`] for an unknown id and with
    /// [`AtelierError::DuplicateName`] when the name collides with a
    /// different file.
    pub fn rename_file(&mut self, id: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        let current = self.file(id)?.name.clone();
        if new_name.is_empty() || new_name == current {
            return Ok(());
        }
        if self.find_by_name(new_name).is_some() {
            return Err(AtelierError::duplicate_name(new_name));
        }
        self.file_mut(id)?.name = new_name.to_string();
        Ok(())
    }

    /// Deletes a file.
    ///
    /// If the deleted file was active, the first remaining file in
    /// iteration order becomes active, or `None` when the project is
    /// empty afterwards.
    pub fn delete_file(&mut self, id: &str) -> Result<()> {
        // shift_remove keeps insertion order for the remaining files.
        let removed = self
            .files
            .shift_remove(id)
            .ok_or_else(|| AtelierError::not_found("file", id))?;
        if self.active_file_id.as_deref() == Some(id) {
            self.active_file_id = self.files.keys().next().cloned();
        }
        tracing::debug!(file = removed.name, "deleted project file");
        Ok(())
    }

    /// Sets (or clears) the active file.
    pub fn set_active_file(&mut self, id: Option<String>) -> Result<()> {
        if let Some(id) = &id {
            if !self.files.contains_key(id) {
                return Err(AtelierError::not_found("file", id.clone()));
            }
        }
        self.active_file_id = id;
        Ok(())
    }

    /// Exact-match lookup by name. O(n) over a table of tens of files.
    pub fn find_by_name(&self, name: &str) -> Option<&ProjectFile> {
        self.files.values().find(|f| f.name == name)
    }

    /// Returns a file by id or [`AtelierError::NotFound`].
    pub fn file(&self, id: &str) -> Result<&ProjectFile> {
        self.files
            .get(id)
            .ok_or_else(|| AtelierError::not_found("file", id))
    }

    /// Mutable access to a file by id.
    pub fn file_mut(&mut self, id: &str) -> Result<&mut ProjectFile> {
        self.files
            .get_mut(id)
            .ok_or_else(|| AtelierError::not_found("file", id))
    }

    /// Returns the currently active file, if any.
    pub fn active_file(&self) -> Option<&ProjectFile> {
        self.active_file_id.as_ref().and_then(|id| self.files.get(id))
    }

    /// Replaces the content of the currently active file.
    ///
    /// This is the live-editing path used by the presentation layer for
    /// char-by-char updates; it does not snapshot.
    pub fn edit_active_content(&mut self, content: &str) -> Result<()> {
        let id = self
            .active_file_id
            .clone()
            .ok_or_else(|| AtelierError::not_found("file", "<active>"))?;
        self.file_mut(&id)?.content = content.to_string();
        Ok(())
    }

    /// Resets the project to an empty state with the default preview
    /// target.
    pub fn clear(&mut self) {
        *self = ProjectState::default();
    }

    fn names_are_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.files.values().all(|f| seen.insert(f.name.as_str()))
    }

    /// Checks the store invariants. Used by tests.
    pub fn check_invariants(&self) -> bool {
        let active_ok = match &self.active_file_id {
            None => true,
            Some(id) => self.files.contains_key(id),
        };
        active_ok && self.names_are_unique()
    }
}
