pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiService;
pub use prompt::{RESPONSE_SCHEMA, build_request};

/// Everything the model needs for one analysis call.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
    pub response_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request to interaction service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("interaction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("interaction service returned no text ({reason})")]
    EmptyResponse { reason: String },
}

/// Hosted model that turns a prompt plus schema into a JSON text payload.
///
/// Implementations make exactly one outbound call per `analyze` and never
/// retry.
#[async_trait]
pub trait InteractionService: Send + Sync {
    async fn analyze(&self, request: &InteractionRequest) -> Result<String, ServiceError>;
}
