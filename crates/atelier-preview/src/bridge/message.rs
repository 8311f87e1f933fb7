//! Wire format for messages posted from the preview runtime to the host.

use serde::{Deserialize, Serialize};

/// Console severity forwarded from the preview runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

/// A message from the sandboxed preview to the host.
///
/// The preview runtime posts these as JSON with a `type` discriminator;
/// unknown message types fail to parse and are dropped by the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    /// Console output or an uncaught runtime error.
    Console { level: ConsoleLevel, message: String },
    /// The user clicked an internal link; `file` is the target name.
    Nav { file: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_message_parses_from_wire_json() {
        let json = r#"{"type":"console","level":"error","message":"boom"}"#;
        let msg: BridgeMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            BridgeMessage::Console {
                level: ConsoleLevel::Error,
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn nav_message_parses_from_wire_json() {
        let json = r#"{"type":"nav","file":"about.html"}"#;
        let msg: BridgeMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            BridgeMessage::Nav {
                file: "about.html".to_string()
            }
        );
    }
}
