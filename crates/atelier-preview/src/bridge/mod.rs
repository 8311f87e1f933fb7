//! Execution bridge: typed messages from the sandboxed preview runtime.

mod console;
mod mailbox;
mod message;

pub use console::{ConsoleEntry, ConsoleLog};
pub use mailbox::{BridgeMailbox, BridgeReceiver, bridge_channel};
pub use message::{BridgeMessage, ConsoleLevel};
