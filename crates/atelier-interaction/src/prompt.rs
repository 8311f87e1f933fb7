//! Prompt templates.
//!
//! All model-facing text lives here, rendered with minijinja so the file
//! context and error messages interpolate cleanly.

use atelier_core::project::ProjectState;
use atelier_core::{AtelierError, Result};
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

const CODING_SYSTEM: &str = r#"You are a world-class AI software engineer integrated into a professional coding environment that mirrors VS Code. You have the capability to execute and debug any programming language (client-side or server-side, e.g., Python, PHP, Node.js, TSX) in a secure, containerized backend.

**Your Task:**
1.  **Analyze the user's request** in the context of the complete project files provided.
2.  **Formulate a plan:** Think step-by-step how to fulfill the request. This might involve creating new files, updating existing ones, or deleting obsolete ones.
3.  **Generate a response:** Your response MUST be a single JSON object that strictly adheres to the provided schema.
    *   **`displayText`:** Provide a concise, helpful explanation of the changes you are about to make. Explain your reasoning. If you are fixing a bug, describe the root cause.
    *   **`actions`:** Create a list of file operations. Be precise. Only modify what is necessary. For updates, provide the FULL, complete content of the file.

**Crucial Instructions:**
*   You are NOT a simple text generator. You are a code generator and manipulator.
*   NEVER include markdown code blocks (e.g., ```js ... ```) in the `displayText` property. ALL code must be delivered through the `actions` property.
*   Analyze file extensions (.py, .php, .tsx) to understand the project's nature and apply the correct logic.
*   When the user asks to "run" or "debug" the code, explain what you did (e.g., "I executed the Python script," "I compiled and ran the React app") and what the result was (output, errors, etc.). The user's preview pane is only for web-based projects; your execution environment is universal.

**CURRENT FILES IN SANDBOX:**
{% if files %}{% for file in files %}// file: {{ file.name }}
{{ file.content }}{% if not loop.last %}

---

{% endif %}{% endfor %}{% else %}(No files in sandbox yet){% endif %}"#;

const CHAT_SYSTEM: &str = r#"You are an advanced AI agent. Your goal is to be as helpful as possible.
You have three main modes of response:
1.  **Standard Text:** Provide well-formatted text answers using markdown for general questions.
2.  **Interactive Widget:** For requests that would benefit from a small, interactive UI (like a calculator, color picker, simple game, or data visualizer), you can create a self-contained widget. To do this, populate the 'widget' property in your JSON response with the widget's name, HTML, CSS, and JavaScript. The code must be entirely self-contained. Always provide an explanation of the widget in the 'displayText' property.
3.  **Coding Sandbox:** For complex coding tasks (e.g., multi-file projects, debugging existing code, building a full webpage), suggest enabling the interactive coding sandbox by setting 'request_enable_sandbox' to true.

Your response must always be a single JSON object that strictly follows the provided schema. Do not use a widget and request the sandbox at the same time."#;

const FIX_ERROR: &str = r#"The code in the sandbox produced this error: "{{ error_message }}". You are an expert software engineer. Your task is to analyze all the files in the current sandbox context (which can include any language like HTML, CSS, JS, PHP, Python), identify the root cause of the error, and provide a fix. Explain the problem clearly in the displayText before providing the file actions."#;

const TITLE: &str = r#"Based on this conversation:

User: "{{ user_prompt }}"
AI: "{{ ai_response }}"

Generate a very short, concise title for this chat (5 words max)."#;

const RUN_FILE: &str = r#"{% if file_name %}Run the file "{{ file_name }}". If it's part of a larger project (like a web app), run the whole project with "{{ file_name }}" as the context.{% else %}Run the current project in the sandbox.{% endif %}"#;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        ("coding_system", CODING_SYSTEM),
        ("chat_system", CHAT_SYSTEM),
        ("fix_error", FIX_ERROR),
        ("title", TITLE),
        ("run_file", RUN_FILE),
    ] {
        // Templates are compiled-in constants; failing to add one is a
        // build defect, not a runtime condition.
        if let Err(e) = env.add_template(name, source) {
            panic!("invalid builtin template {name}: {e}");
        }
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    let template = TEMPLATES
        .get_template(name)
        .map_err(|e| AtelierError::internal(format!("missing template {name}: {e}")))?;
    template
        .render(ctx)
        .map_err(|e| AtelierError::internal(format!("render {name}: {e}")))
}

/// System instruction for coding mode, carrying the full file context.
pub fn coding_system_instruction(state: &ProjectState) -> Result<String> {
    let files: Vec<_> = state
        .files
        .values()
        .map(|f| context! { name => f.name, content => f.content })
        .collect();
    render("coding_system", context! { files => files })
}

/// System instruction for regular chat mode.
pub fn chat_system_instruction() -> Result<String> {
    render("chat_system", context! {})
}

/// User-turn prompt asking the model to fix a runtime error.
pub fn fix_error_prompt(error_message: &str) -> Result<String> {
    render("fix_error", context! { error_message => error_message })
}

/// Prompt for generating a short chat title from the first exchange.
pub fn title_prompt(user_prompt: &str, ai_response: &str) -> Result<String> {
    render(
        "title",
        context! { user_prompt => user_prompt, ai_response => ai_response },
    )
}

/// User-turn prompt asking the model to run the active file.
pub fn run_file_prompt(file_name: Option<&str>) -> Result<String> {
    render("run_file", context! { file_name => file_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coding_instruction_lists_files_in_order() {
        let mut state = ProjectState::default();
        state.create_file("index.html", "<p/>").unwrap();
        state.create_file("app.js", "let x = 1;").unwrap();
        let instruction = coding_system_instruction(&state).unwrap();
        let html = instruction.find("// file: index.html").unwrap();
        let js = instruction.find("// file: app.js").unwrap();
        assert!(html < js);
        assert!(instruction.contains("let x = 1;"));
    }

    #[test]
    fn empty_sandbox_gets_placeholder_context() {
        let state = ProjectState::default();
        let instruction = coding_system_instruction(&state).unwrap();
        assert!(instruction.contains("(No files in sandbox yet)"));
    }

    #[test]
    fn fix_error_prompt_embeds_message() {
        let prompt = fix_error_prompt("x is not defined").unwrap();
        assert!(prompt.contains("\"x is not defined\""));
    }

    #[test]
    fn run_file_prompt_varies_by_target() {
        let with_file = run_file_prompt(Some("main.py")).unwrap();
        assert!(with_file.contains("\"main.py\""));
        let without = run_file_prompt(None).unwrap();
        assert!(without.contains("current project"));
    }
}
