//! Inline chat widgets: small self-contained interactive fragments the
//! model can embed in a reply, rendered apart from the sandbox project.

use serde::{Deserialize, Serialize};

/// Base style so widget content fills its frame without margins.
const WIDGET_BASE_STYLE: &str = "body { margin: 0; font-family: sans-serif; }";

/// A renderable widget proposed inside a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub javascript: String,
    /// Preferred frame height in pixels, when the model suggests one.
    #[serde(default)]
    pub height: Option<u32>,
}

/// Assembles the widget into one standalone HTML document.
///
/// Widgets get no runtime shim and no bridge: they are display-only
/// islands and must not reach the project console or navigation.
pub fn assemble_widget_document(widget: &Widget) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    html.push_str(WIDGET_BASE_STYLE);
    html.push('\n');
    html.push_str(&widget.css);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str(&widget.html);
    html.push_str("\n<script>\n");
    html.push_str(&widget.javascript);
    html.push_str("\n</script>\n</body>\n</html>");
    html
}
