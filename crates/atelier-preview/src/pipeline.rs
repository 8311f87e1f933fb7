//! Build pipeline: project files in, self-contained preview document out.
//!
//! The composition is deterministic: the same project state always
//! produces byte-identical output, so rebuilds can be compared and
//! cached by the embedder.

use std::sync::Arc;

use atelier_core::Result;
use atelier_core::project::{FileKind, ProjectFile, ProjectState, ScriptDialect};
use atelier_core::services::ScriptTranspiler;

/// Body used when the project has no entry page at all.
const MISSING_ENTRY_BODY: &str =
    "<div class=\"placeholder\">No index.html file found in the sandbox.</div>";

/// Script injected ahead of user code. Intercepts console methods and
/// uncaught errors, and rewrites internal link clicks into nav messages,
/// all posted to the host as JSON bridge payloads.
const RUNTIME_SHIM: &str = r#"(function () {
  function post(payload) {
    if (window.parent && window.parent !== window) {
      window.parent.postMessage(JSON.stringify(payload), '*');
    }
  }
  function hook(level) {
    var original = console[level];
    console[level] = function () {
      var message = Array.prototype.slice.call(arguments).map(function (a) {
        if (typeof a === 'object') { try { return JSON.stringify(a); } catch (e) { return String(a); } }
        return String(a);
      }).join(' ');
      post({ type: 'console', level: level, message: message });
      original.apply(console, arguments);
    };
  }
  hook('log'); hook('warn'); hook('error');
  window.addEventListener('error', function (event) {
    post({ type: 'console', level: 'error', message: event.message });
  });
  document.addEventListener('click', function (event) {
    var anchor = event.target && event.target.closest ? event.target.closest('a') : null;
    if (!anchor) { return; }
    var href = anchor.getAttribute('href');
    if (!href || href.indexOf('://') !== -1 || href.charAt(0) === '#') { return; }
    event.preventDefault();
    post({ type: 'nav', file: href });
  });
})();"#;

/// A fully composed preview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    /// Complete HTML document, ready to load into a sandboxed frame.
    pub html: String,
    /// Name of the file used as the page body, when one existed.
    pub entry_name: Option<String>,
}

/// Composes preview documents from project state.
pub struct BuildPipeline {
    transpiler: Arc<dyn ScriptTranspiler>,
}

impl BuildPipeline {
    pub fn new(transpiler: Arc<dyn ScriptTranspiler>) -> Self {
        Self { transpiler }
    }

    /// Builds the preview document for the current project state.
    ///
    /// Fails only when script transpilation fails; the caller decides
    /// what to show in that case (the previous document stays up).
    pub async fn build(&self, state: &ProjectState) -> Result<PreviewDocument> {
        let entry = Self::entry_file(state);
        let style_block = Self::compose_styles(state);
        let script_body = Self::compose_scripts(state);

        let compiled = if script_body.is_empty() {
            String::new()
        } else {
            // The concatenated body is lowered as TSX so any mix of
            // dialects across files compiles in one pass.
            self.transpiler
                .transpile(&script_body, ScriptDialect::Tsx)
                .await?
        };

        let body = entry.map(|f| f.content.as_str()).unwrap_or(MISSING_ENTRY_BODY);
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
        html.push_str(&style_block);
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str(body);
        html.push_str("\n<script>\n");
        html.push_str(RUNTIME_SHIM);
        if !compiled.is_empty() {
            html.push_str("\ntry {\n");
            html.push_str(&compiled);
            html.push_str("\n} catch (e) { console.error(e && e.message ? e.message : String(e)); }");
        }
        html.push_str("\n</script>\n</body>\n</html>");

        Ok(PreviewDocument {
            html,
            entry_name: entry.map(|f| f.name.clone()),
        })
    }

    /// The preview target when it exists, else `index.html`, else none.
    fn entry_file(state: &ProjectState) -> Option<&ProjectFile> {
        state
            .files
            .values()
            .find(|f| f.name == state.preview_target)
            .or_else(|| state.files.values().find(|f| f.name == "index.html"))
    }

    /// Concatenates every stylesheet in file order, each prefixed with a
    /// marker comment naming its source file.
    fn compose_styles(state: &ProjectState) -> String {
        let mut block = String::new();
        for file in state.files.values().filter(|f| f.kind().is_stylesheet()) {
            block.push_str("/*==> ");
            block.push_str(&file.name);
            block.push_str(" <==*/\n");
            block.push_str(&file.content);
            block.push('\n');
        }
        block
    }

    /// Concatenates every script in file order, each isolated in its own
    /// IIFE so top-level declarations never collide across files.
    fn compose_scripts(state: &ProjectState) -> String {
        let mut body = String::new();
        for file in state.files.values() {
            if !matches!(file.kind(), FileKind::Script(_)) {
                continue;
            }
            body.push_str("\n// File: ");
            body.push_str(&file.name);
            body.push_str("\n;\n(function(){\n");
            body.push_str(&file.content);
            body.push_str("\n})();\n");
        }
        body
    }
}
