//! Remote structured-completion service.
//!
//! `CompletionService` is the seam the extractor talks to. `OpenAiClient` is the
//! production implementation: an OpenAI-compatible `/chat/completions` endpoint
//! with a strict JSON-schema response format.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, EXIT_INPUT};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// One structured-completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub schema_name: &'a str,
    pub schema: &'a Value,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Completion service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    MalformedBody(String),

    #[error("Model refused the request: {0}")]
    Refusal(String),

    #[error("Completion response contained no choices")]
    EmptyChoice,
}

/// Anything that turns a prompt plus schema into a JSON document.
pub trait CompletionService {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<Value, CompletionError>;
}

impl<T: CompletionService + ?Sized> CompletionService for Box<T> {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<Value, CompletionError> {
        (**self).complete(request)
    }
}

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client from `OPENAI_API_KEY` (and optional `OPENAI_BASE_URL`),
    /// reading `.env` first.
    ///
    /// `timeout` of `None` keeps the HTTP client's default.
    pub fn from_env(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::new(EXIT_INPUT, "Missing OPENAI_API_KEY in environment (.env)."))?;
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl CompletionService for OpenAiClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<Value, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    strict: true,
                    schema: request.schema,
                },
            },
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(e.to_string())
                } else {
                    CompletionError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| CompletionError::MalformedBody(e.to_string()))?;

        parse_choice(parsed)
    }
}

fn parse_choice(response: ChatResponse) -> Result<Value, CompletionError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::EmptyChoice)?
        .message;

    if let Some(refusal) = message.refusal {
        return Err(CompletionError::Refusal(refusal));
    }

    let content = message.content.ok_or(CompletionError::EmptyChoice)?;
    serde_json::from_str(&content).map_err(|e| CompletionError::MalformedBody(e.to_string()))
}
