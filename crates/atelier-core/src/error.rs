//! Error types for the Atelier sandbox engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Atelier workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every variant is scoped to
/// the operation that raised it; none is fatal to the process.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AtelierError {
    /// A file with the same name already exists in the project.
    #[error("A file named '{name}' already exists")]
    DuplicateName { name: String },

    /// Entity not found error with type information.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// No snapshot with the requested timestamp exists for a file.
    #[error("No version of '{file}' at timestamp {timestamp}")]
    VersionNotFound { file: String, timestamp: i64 },

    /// Script transpilation failed; the previous preview is kept.
    #[error("Transpilation error: {0}")]
    Transpile(String),

    /// Code formatting failed; the file content is unchanged.
    #[error("Format error: {0}")]
    Format(String),

    /// The model returned a response that could not be parsed as the
    /// expected structured shape even after lenient recovery.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Chat transport failure. `rate_limited` distinguishes throttling
    /// from generic request failure.
    #[error("{message}")]
    Transport { message: String, rate_limited: bool },

    /// IO error (file system operations).
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtelierError {
    /// Creates a DuplicateName error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Creates a NotFound error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a VersionNotFound error.
    pub fn version_not_found(file: impl Into<String>, timestamp: i64) -> Self {
        Self::VersionNotFound {
            file: file.into(),
            timestamp,
        }
    }

    /// Creates a transport error for a rate-limited request.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            rate_limited: true,
        }
    }

    /// Creates a generic transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            rate_limited: false,
        }
    }

    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a DuplicateName error.
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    /// Check if this error is recoverable at the session level.
    ///
    /// All store/history errors abort only the operation that raised them
    /// and leave state unchanged.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Check if this is a transport error caused by rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                rate_limited: true,
                ..
            }
        )
    }
}

impl From<std::io::Error> for AtelierError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AtelierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AtelierError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AtelierError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (boundary with repository traits).
impl From<anyhow::Error> for AtelierError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, AtelierError>`.
pub type Result<T> = std::result::Result<T, AtelierError>;
