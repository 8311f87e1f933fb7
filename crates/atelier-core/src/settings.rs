//! User-facing application settings.

use serde::{Deserialize, Serialize};

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Settings persisted across launches.
///
/// Every field carries a serde default so settings files written by
/// older builds keep loading after new fields appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub theme: Theme,
    /// Sampling temperature passed through to the model.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Typing reveal speed in words per minute.
    #[serde(default = "default_typing_wpm")]
    pub typing_wpm: u32,
    /// Whether the sandbox panel starts open.
    #[serde(default)]
    pub sandbox_open: bool,
}

fn default_temperature() -> f64 {
    0.5
}

fn default_typing_wpm() -> u32 {
    800
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            temperature: default_temperature(),
            typing_wpm: default_typing_wpm(),
            sandbox_open: false,
        }
    }
}
