//! Chat transport abstraction.
//!
//! One request in, one complete reply text out. Streaming, retries, and
//! provider quirks live behind this trait.

use async_trait::async_trait;
use atelier_core::Result;
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn, in provider-neutral terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of conversation context sent with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// A complete generation request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Conversation so far, oldest first, ending with the new user turn.
    pub turns: Vec<ChatTurn>,
    pub system_instruction: Option<String>,
    pub temperature: f64,
    /// When set, the provider is asked for JSON conforming to this
    /// schema. The reply still goes through the lenient parse chain
    /// because models do not always comply.
    pub response_schema: Option<serde_json::Value>,
}

impl ChatRequest {
    pub fn new(turns: Vec<ChatTurn>) -> Self {
        Self {
            turns,
            system_instruction: None,
            temperature: 0.5,
            response_schema: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Provider-neutral chat generation.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Generates one complete reply for the request.
    async fn generate(&self, request: ChatRequest) -> Result<String>;
}
