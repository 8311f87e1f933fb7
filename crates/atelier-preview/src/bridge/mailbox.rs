//! Channel between the preview runtime and the host.

use tokio::sync::mpsc;

use super::message::BridgeMessage;

/// Posting half of the bridge, handed to whatever embeds the preview.
#[derive(Debug, Clone)]
pub struct BridgeMailbox {
    tx: mpsc::UnboundedSender<BridgeMessage>,
}

impl BridgeMailbox {
    /// Posts a parsed message. Dropped silently when the host is gone.
    pub fn post(&self, message: BridgeMessage) {
        let _ = self.tx.send(message);
    }

    /// Parses raw JSON from the preview runtime and posts it. Unknown or
    /// malformed payloads are dropped with a debug log; the preview must
    /// not be able to break the host with garbage.
    pub fn post_raw(&self, raw: &str) {
        match serde_json::from_str::<BridgeMessage>(raw) {
            Ok(message) => self.post(message),
            Err(e) => tracing::debug!(error = %e, "dropping unparsable bridge payload"),
        }
    }
}

/// Receiving half of the bridge, owned by the host.
#[derive(Debug)]
pub struct BridgeReceiver {
    rx: mpsc::UnboundedReceiver<BridgeMessage>,
}

impl BridgeReceiver {
    /// Drains every message currently queued, in arrival order.
    pub fn drain(&mut self) -> Vec<BridgeMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Creates a connected mailbox/receiver pair.
pub fn bridge_channel() -> (BridgeMailbox, BridgeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeMailbox { tx }, BridgeReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::message::ConsoleLevel;

    #[test]
    fn drains_in_arrival_order() {
        let (mailbox, mut receiver) = bridge_channel();
        mailbox.post(BridgeMessage::Console {
            level: ConsoleLevel::Log,
            message: "first".to_string(),
        });
        mailbox.post(BridgeMessage::Nav {
            file: "a.html".to_string(),
        });
        let drained = receiver.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(&drained[0], BridgeMessage::Console { message, .. } if message == "first"));
        assert!(matches!(&drained[1], BridgeMessage::Nav { file } if file == "a.html"));
    }

    #[test]
    fn malformed_raw_payload_is_dropped() {
        let (mailbox, mut receiver) = bridge_channel();
        mailbox.post_raw("not json at all");
        mailbox.post_raw(r#"{"type":"console","level":"warn","message":"ok"}"#);
        let drained = receiver.drain();
        assert_eq!(drained.len(), 1);
    }
}
