use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{InteractionRequest, InteractionService, ServiceError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiService {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl GeminiService {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(model)
        )
    }
}

// -- wire format

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a InteractionRequest) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, ServiceError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ServiceError::EmptyResponse {
                reason: format!("prompt blocked: {}", reason),
            });
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::EmptyResponse {
                reason: "no candidates".to_string(),
            })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::EmptyResponse {
                reason: format!(
                    "finish reason {}",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl InteractionService for GeminiService {
    async fn analyze(&self, request: &InteractionRequest) -> Result<String, ServiceError> {
        let url = self.endpoint(&request.model);
        info!("Calling interaction service model '{}'", request.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GenerateContentRequest::from_request(request))
            .send()
            .await?;

        info!("Received response status: {}", response.status());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!("Response body: {}", body);

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::EmptyResponse {
                reason: format!("unreadable response envelope: {}", e),
            })?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction_service::build_request;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const MODEL_PATH: &str = "/v1beta/models/gemini-test:generateContent";

    /// Serve a fake Gemini endpoint and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn service(base_url: String) -> GeminiService {
        GeminiService::new(base_url, SecretString::from("test-key"))
    }

    #[test]
    fn test_endpoint_format() {
        let svc = service("https://example.test/".to_string());
        assert_eq!(
            svc.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let request = build_request("gemini-test", "Warfarin, Aspirin", "Dr. Rx");
        let wire = serde_json::to_value(GenerateContentRequest::from_request(&request)).unwrap();

        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["contents"][0]["parts"][0]["text"], request.prompt.as_str());
        assert!(wire["systemInstruction"].get("role").is_none());
        assert_eq!(
            wire["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(wire["generationConfig"]["responseSchema"], request.response_schema);
    }

    #[tokio::test]
    async fn test_analyze_returns_candidate_text_and_sends_key() {
        let seen: Arc<Mutex<Vec<(Option<String>, Value)>>> = Arc::default();
        let recorder = seen.clone();
        let router = Router::new().route(
            MODEL_PATH,
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    recorder.lock().unwrap().push((key, body));
                    Json(json!({
                        "candidates": [{
                            "content": {"parts": [
                                {"text": "{\"interactions\": [], "},
                                {"text": "\"summary\": \"none\"}"}
                            ]},
                            "finishReason": "STOP"
                        }]
                    }))
                }
            }),
        );
        let svc = service(serve(router).await);

        let request = build_request("gemini-test", "Acetaminophen", "Dr. Rx");
        let text = svc.analyze(&request).await.unwrap();

        assert_eq!(text, "{\"interactions\": [], \"summary\": \"none\"}");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "exactly one outbound call");
        assert_eq!(seen[0].0.as_deref(), Some("test-key"));
        assert_eq!(
            seen[0].1["generationConfig"]["responseSchema"]["required"],
            json!(["interactions", "summary"])
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let router = Router::new().route(
            MODEL_PATH,
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let svc = service(serve(router).await);

        let err = svc
            .analyze(&build_request("gemini-test", "Aspirin", "Dr. Rx"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_error() {
        let router = Router::new().route(
            MODEL_PATH,
            post(|| async { Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})) }),
        );
        let svc = service(serve(router).await);

        let err = svc
            .analyze(&build_request("gemini-test", "Aspirin", "Dr. Rx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyResponse { .. }));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let svc = service(format!("http://{}", addr));
        let err = svc
            .analyze(&build_request("gemini-test", "Aspirin", "Dr. Rx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
