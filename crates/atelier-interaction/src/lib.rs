//! Model interaction: transport, prompts, reply parsing, typing reveal.

pub mod gemini;
pub mod prompt;
pub mod reply;
pub mod transport;
pub mod typing;

pub use gemini::{DEFAULT_GEMINI_MODEL, GeminiChatClient};
pub use reply::{AssistantReply, ReplyPayload, parse_reply};
pub use transport::{ChatRequest, ChatTransport, ChatTurn, TurnRole};
pub use typing::{TypingTask, TypingUpdate, start_reveal};
