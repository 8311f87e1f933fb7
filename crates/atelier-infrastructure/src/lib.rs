//! Infrastructure: persistence, external tools, and path resolution.

pub mod archive;
pub mod dto;
pub mod format;
pub mod paths;
pub mod session_store;
pub mod settings_store;
pub mod transpile;

pub use archive::TarGzArchiveWriter;
pub use format::CommandFormatter;
pub use paths::AtelierPaths;
pub use session_store::JsonDirSessionStore;
pub use settings_store::SettingsStore;
pub use transpile::CommandTranspiler;
