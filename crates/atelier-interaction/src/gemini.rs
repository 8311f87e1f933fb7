//! Gemini REST implementation of [`ChatTransport`].
//!
//! Talks to the `generateContent` endpoint directly; no SDK dependency.

use async_trait::async_trait;
use atelier_core::{AtelierError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::transport::{ChatRequest, ChatTransport, TurnRole};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Chat transport backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiChatClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_body(request: &ChatRequest) -> GenerateContentRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                }
                .to_string(),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system_instruction.as_ref().map(|text| Content {
            role: "system".to_string(),
            parts: vec![Part { text: text.clone() }],
        });

        let generation_config = GenerationConfig {
            temperature: request.temperature,
            response_mime_type: request
                .response_schema
                .as_ref()
                .map(|_| "application/json".to_string()),
            response_schema: request.response_schema.clone(),
        };

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }
}

#[async_trait]
impl ChatTransport for GeminiChatClient {
    async fn generate(&self, request: ChatRequest) -> Result<String> {
        let url = format!(
            "{BASE_URL}/{model}:generateContent?key={api_key}",
            model = self.model,
            api_key = self.api_key
        );
        let body = Self::build_body(&request);

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| AtelierError::transport(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| AtelierError::MalformedResponse(format!("invalid body: {err}")))?;

        extract_text_response(parsed)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            AtelierError::MalformedResponse("no text in response candidates".to_string())
        })
}

fn map_http_error(status: StatusCode, body: String) -> AtelierError {
    let (message, api_status) = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            (
                wrapper.error.message.unwrap_or_else(|| body.clone()),
                wrapper.error.status.unwrap_or_default(),
            )
        })
        .unwrap_or_else(|_| (body.clone(), String::new()));

    // Quota exhaustion arrives as HTTP 429 or as a RESOURCE_EXHAUSTED
    // status string; both get the rate-limited affordance.
    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        return AtelierError::rate_limited(message);
    }

    tracing::warn!(status = %status, "chat transport request failed");
    AtelierError::transport(format!("{status}: {message}"))
}
