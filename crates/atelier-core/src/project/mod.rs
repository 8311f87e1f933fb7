//! Project domain module.
//!
//! - `model`: project/file/snapshot domain models and file-kind detection
//! - `store`: Virtual Project Store mutations and invariants
//! - `history`: Version History Manager (snapshot/list/restore)

mod history;
mod model;
mod store;

pub use history::{HISTORY_CAP, SnapshotOutcome};
pub use model::{
    DEFAULT_PREVIEW_TARGET, FileKind, ProjectFile, ProjectState, ScriptDialect, Snapshot,
};
