//! OpenAI-compatible provider implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM and any endpoint exposing
//! `/v1/chat/completions` and `/v1/embeddings`.
//!
//! Supports:
//! - Chat completions (non-streaming)
//! - Embeddings, through [`OpenAiEmbedder`]
//! - Model listing and health checks

use async_trait::async_trait;
use ragdesk_core::error::{CompletionError, RetrievalError};
use ragdesk_core::message::Message;
use ragdesk_core::provider::*;
use ragdesk_core::retrieval::EmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Seconds to wait after a 429 when the endpoint sends no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// An OpenAI-compatible completion client.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider with a 120s request timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::with_timeout(name, base_url, api_key, Duration::from_secs(120))
    }

    pub fn with_timeout(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an OpenRouter provider (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Create an Ollama provider (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role().as_str().into(),
                content: Some(m.content().to_string()),
            })
            .collect()
    }

    fn map_send_error(e: reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout(e.to_string())
        } else {
            CompletionError::Network(e.to_string())
        }
    }

    /// POST a JSON body and return the successful response, mapping HTTP
    /// failures onto [`CompletionError`].
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<reqwest::Response, CompletionError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();
        if status == 200 {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let error_body = response.text().await.unwrap_or_default();
        warn!(provider = %self.name, status, body = %error_body, "Provider returned error");

        Err(error_for_status(status, retry_after, error_body))
    }

    /// Embed several texts in one request.
    pub async fn embed_texts(
        &self,
        model: &str,
        inputs: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, CompletionError> {
        let body = serde_json::json!({
            "model": model,
            "input": inputs,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %model,
            count = inputs.len(),
            "Sending embedding request"
        );

        let response = self.post_json("embeddings", &body).await?;
        let api_resp: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(format!("embedding response: {e}")))?;

        if api_resp.data.len() != inputs.len() {
            return Err(CompletionError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                api_resp.data.len()
            )));
        }

        let mut data = api_resp.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Map a non-200 status onto the completion error taxonomy.
fn error_for_status(status: u16, retry_after: Option<u64>, body: String) -> CompletionError {
    match status {
        429 => CompletionError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        401 | 403 => CompletionError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        _ => CompletionError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError> {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self.post_json("chat/completions", &body).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        parse_completion(api_response)
    }

    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Ok(response.status().is_success())
    }
}

fn parse_completion(api_response: ApiResponse) -> std::result::Result<CompletionResponse, CompletionError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("No choices in response".into()))?;

    let usage = api_response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        model: api_response.model,
    })
}

/// Embedding provider backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    provider: Arc<OpenAiCompatProvider>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(provider: Arc<OpenAiCompatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &str {
        self.provider.name.as_str()
    }

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RetrievalError::Embedding("empty embedding response".into()))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.provider
            .embed_texts(&self.model, texts)
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))
    }
}

// --- API types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// --- Embedding API types ---

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdesk_core::error::CompletionFailureKind;

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
        assert!(provider.base_url().contains("api.openai.com"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:8000/v1/", "k");
        assert_eq!(provider.base_url(), "http://localhost:8000/v1");
    }

    #[test]
    fn ollama_constructor() {
        let provider = OpenAiCompatProvider::ollama(None);
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url().contains("localhost:11434"));
    }

    #[test]
    fn message_conversion() {
        let messages = vec![
            Message::system("You are an IT Support Assistant"),
            Message::user("Hello"),
            Message::assistant("Hi there"),
        ];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 3);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert_eq!(api_messages[2].role, "assistant");
        assert_eq!(api_messages[1].content.as_deref(), Some("Hello"));
    }

    #[test]
    fn status_429_is_rate_limit() {
        let err = error_for_status(429, Some(12), String::new());
        assert!(matches!(err, CompletionError::RateLimited { retry_after_secs: 12 }));
        assert_eq!(err.kind(), CompletionFailureKind::RateLimit);

        let err = error_for_status(429, None, String::new());
        assert!(matches!(err, CompletionError::RateLimited { retry_after_secs: 5 }));
    }

    #[test]
    fn status_401_is_auth_failure() {
        let err = error_for_status(401, None, "nope".into());
        assert!(matches!(err, CompletionError::AuthenticationFailed(_)));
        assert_eq!(err.kind(), CompletionFailureKind::Other);
    }

    #[test]
    fn other_status_keeps_body() {
        let err = error_for_status(400, None, "bad request".into());
        assert!(matches!(
            err,
            CompletionError::ApiError { status_code: 400, ref message } if message == "bad request"
        ));
    }

    #[test]
    fn parse_completion_response() {
        let json = r#"{
            "model": "gpt-3.5-turbo-0125",
            "choices": [{"message": {"role": "assistant", "content": "Open the portal."}}],
            "usage": {"prompt_tokens": 40, "completion_tokens": 4, "total_tokens": 44}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(json).unwrap();
        let response = parse_completion(parsed).unwrap();
        assert_eq!(response.content, "Open the portal.");
        assert_eq!(response.model, "gpt-3.5-turbo-0125");
        assert_eq!(response.usage.unwrap().total_tokens, 44);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let json = r#"{"model": "m", "choices": []}"#;
        let parsed: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parse_completion(parsed),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn parse_embedding_response() {
        let json = r#"{
            "data": [
                {"embedding": [0.4, 0.5, 0.6], "index": 1},
                {"embedding": [0.1, 0.2, 0.3], "index": 0}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let parsed: EmbeddingApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].index, 1);
        assert_eq!(parsed.data[1].embedding, vec![0.1, 0.2, 0.3]);
    }
}
