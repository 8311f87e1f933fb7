//! Preview composition and the execution bridge.
//!
//! Turns a project's virtual files into one self-contained HTML document
//! and carries console/navigation traffic back from the sandboxed
//! runtime to the host.

pub mod bridge;
pub mod host;
pub mod pipeline;
pub mod widget;

pub use host::PreviewHost;
pub use pipeline::{BuildPipeline, PreviewDocument};
pub use widget::{Widget, assemble_widget_document};
