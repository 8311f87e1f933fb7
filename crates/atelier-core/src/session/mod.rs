//! Session management: conversation plus sandbox, persisted as a unit.

mod manager;
mod message;
mod model;
mod repository;

pub use manager::{DEFAULT_SESSION_TITLE, SessionManager};
pub use message::{ConversationMessage, MessageRole};
pub use model::Session;
pub use repository::SessionStore;
