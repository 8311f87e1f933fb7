//! TOML-backed settings persistence.

use std::path::{Path, PathBuf};

use atelier_core::settings::AppSettings;
use atelier_core::{AtelierError, Result};

use crate::paths::AtelierPaths;

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(AtelierPaths::settings_file()?))
    }

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads settings, falling back to defaults when the file does not
    /// exist yet. Unknown fields are ignored and missing fields default,
    /// so settings survive version changes in both directions.
    pub fn load(&self) -> Result<AppSettings> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AppSettings::default());
            }
            Err(e) => return Err(e.into()),
        };
        match toml::from_str(&text) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(error = %e, "settings file unparsable, using defaults");
                Ok(AppSettings::default())
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(settings)
            .map_err(|e| AtelierError::config(format!("serialize settings: {e}")))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::settings::Theme;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        assert_eq!(store.load().unwrap(), AppSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        let settings = AppSettings {
            theme: Theme::Light,
            temperature: 0.9,
            typing_wpm: 1200,
            sandbox_open: true,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "theme = [broken").unwrap();
        let store = SettingsStore::new(&path);
        assert_eq!(store.load().unwrap(), AppSettings::default());
    }
}
