//! Path resolution for configuration and session data.
//!
//! Everything lives under the platform config directory:
//!
//! ```text
//! ~/.config/atelier/
//! ├── settings.toml
//! ├── sessions/
//! │   └── <session-id>.json
//! └── active_session.txt
//! ```

use std::path::PathBuf;

use atelier_core::{AtelierError, Result};

/// Unified path management for atelier.
pub struct AtelierPaths;

impl AtelierPaths {
    /// Platform config directory for atelier (e.g. `~/.config/atelier`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("atelier"))
            .ok_or_else(|| AtelierError::config("cannot determine config directory"))
    }

    /// Directory holding one JSON file per session.
    pub fn sessions_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("sessions"))
    }

    /// The persisted application settings file.
    pub fn settings_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Marker file naming the active session.
    pub fn active_session_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("active_session.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        let dir = AtelierPaths::config_dir().unwrap();
        assert!(dir.ends_with("atelier"));
    }

    #[test]
    fn derived_paths_live_under_config_dir() {
        let dir = AtelierPaths::config_dir().unwrap();
        assert!(AtelierPaths::sessions_dir().unwrap().starts_with(&dir));
        assert!(AtelierPaths::settings_file().unwrap().starts_with(&dir));
        assert!(
            AtelierPaths::active_session_file()
                .unwrap()
                .starts_with(&dir)
        );
    }
}
