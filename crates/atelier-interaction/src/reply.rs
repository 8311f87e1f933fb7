//! Structured reply parsing.
//!
//! Models are asked for JSON conforming to a schema but do not always
//! comply, so parsing degrades gracefully: strict parse, then a fenced
//! code block rescue, then raw text. Model output is never dropped.

use atelier_core::action::FileAction;
use atelier_preview::Widget;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A parsed structured reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Markdown explanation shown in the chat.
    #[serde(rename = "displayText", default)]
    pub display_text: String,
    /// Proposed file operations, empty outside coding mode.
    #[serde(default)]
    pub actions: Vec<FileAction>,
    /// Optional inline widget.
    #[serde(default)]
    pub widget: Option<Widget>,
    /// Model suggests switching the request into the sandbox.
    #[serde(default)]
    pub request_enable_sandbox: bool,
}

/// What a raw model reply turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    Structured(AssistantReply),
    /// The reply was not parseable JSON; shown verbatim, no actions.
    Raw(String),
}

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    // Matches the first ```json fenced block, tolerant of surrounding prose.
    Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fenced-block pattern")
});

/// Parses a raw model reply.
///
/// A reply that parses as JSON but lacks `displayText` entirely still
/// counts as structured; downstream substitutes a placeholder for the
/// empty text.
pub fn parse_reply(raw: &str) -> ReplyPayload {
    if let Ok(reply) = serde_json::from_str::<AssistantReply>(raw.trim()) {
        return ReplyPayload::Structured(reply);
    }

    if let Some(captures) = FENCED_JSON.captures(raw) {
        if let Some(block) = captures.get(1) {
            if let Ok(reply) = serde_json::from_str::<AssistantReply>(block.as_str()) {
                tracing::debug!("recovered structured reply from fenced block");
                return ReplyPayload::Structured(reply);
            }
        }
    }

    ReplyPayload::Raw(raw.to_string())
}

/// Response schema for coding-mode requests: explanation plus an
/// optional batch of file operations.
pub fn sandbox_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "required": ["displayText"],
        "properties": {
            "displayText": {
                "type": "STRING",
                "description": "A short, helpful explanation of the changes you are making for the user. This is always required. Do NOT include any markdown code blocks in this property; all code must be in the 'actions' property."
            },
            "actions": {
                "type": "ARRAY",
                "description": "An optional list of file operations for the coding sandbox.",
                "items": {
                    "type": "OBJECT",
                    "required": ["action_type", "file_name"],
                    "properties": {
                        "action_type": {
                            "type": "STRING",
                            "enum": ["create_file", "update_file", "delete_file"],
                            "description": "The type of file operation."
                        },
                        "file_name": {
                            "type": "STRING",
                            "description": "The name of the file to perform the action on (e.g., 'index.html', 'script.py')."
                        },
                        "content": {
                            "type": "STRING",
                            "description": "The full code content of the file. Required for 'create_file' and 'update_file'."
                        }
                    }
                }
            }
        }
    })
}

/// Response schema for regular chat: markdown text, an optional widget,
/// and an optional suggestion to move into the sandbox.
pub fn chat_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "required": ["displayText"],
        "properties": {
            "displayText": {
                "type": "STRING",
                "description": "Your text response to the user, formatted in markdown. This should explain the widget if one is provided."
            },
            "request_enable_sandbox": {
                "type": "BOOLEAN",
                "description": "Set to true if you believe the user's request is best handled in the interactive coding sandbox. Omit if providing a widget."
            },
            "widget": {
                "type": "OBJECT",
                "description": "An optional self-contained, interactive widget to display directly in the chat.",
                "properties": {
                    "name": {
                        "type": "STRING",
                        "description": "A short, descriptive name for the widget (e.g., 'Calculator', 'Color Picker')."
                    },
                    "html": {
                        "type": "STRING",
                        "description": "The HTML content for the widget's body."
                    },
                    "css": {
                        "type": "STRING",
                        "description": "The CSS styles for the widget. Should be self-contained."
                    },
                    "javascript": {
                        "type": "STRING",
                        "description": "The JavaScript code for the widget's functionality. Must be self-contained and should not access parent window."
                    },
                    "height": {
                        "type": "NUMBER",
                        "description": "The suggested height of the widget container in pixels. Defaults to 300."
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::action::ActionKind;

    #[test]
    fn strict_json_parses_directly() {
        let raw = r#"{"displayText":"Done.","actions":[{"action_type":"create_file","file_name":"a.js","content":"1"}]}"#;
        let ReplyPayload::Structured(reply) = parse_reply(raw) else {
            panic!("expected structured reply");
        };
        assert_eq!(reply.display_text, "Done.");
        assert_eq!(reply.actions.len(), 1);
        assert_eq!(reply.actions[0].kind, ActionKind::CreateFile);
    }

    #[test]
    fn fenced_block_is_rescued() {
        let raw = "Sure, here you go:\n```json\n{\"displayText\":\"Built it.\"}\n```\nLet me know!";
        let ReplyPayload::Structured(reply) = parse_reply(raw) else {
            panic!("expected structured reply");
        };
        assert_eq!(reply.display_text, "Built it.");
    }

    #[test]
    fn unparseable_reply_falls_back_to_raw() {
        let raw = "not valid json";
        assert_eq!(parse_reply(raw), ReplyPayload::Raw(raw.to_string()));
    }

    #[test]
    fn fenced_block_with_bad_json_falls_back_to_raw() {
        let raw = "```json\n{oops\n```";
        assert_eq!(parse_reply(raw), ReplyPayload::Raw(raw.to_string()));
    }

    #[test]
    fn widget_reply_parses() {
        let raw = r#"{"displayText":"A counter.","widget":{"name":"Counter","html":"<b/>","css":"","javascript":"","height":200}}"#;
        let ReplyPayload::Structured(reply) = parse_reply(raw) else {
            panic!("expected structured reply");
        };
        assert_eq!(reply.widget.unwrap().height, Some(200));
    }

    #[test]
    fn sandbox_suggestion_parses() {
        let raw = r#"{"displayText":"Let's build that.","request_enable_sandbox":true}"#;
        let ReplyPayload::Structured(reply) = parse_reply(raw) else {
            panic!("expected structured reply");
        };
        assert!(reply.request_enable_sandbox);
    }
}
