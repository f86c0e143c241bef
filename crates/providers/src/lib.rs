//! Completion and embedding providers for ragdesk.
//!
//! All completion clients implement `ragdesk_core::CompletionClient`, all
//! embedders `ragdesk_core::EmbeddingProvider`. The `build_*` functions select
//! implementations from configuration.

pub mod hashing;
pub mod openai_compat;
pub mod retry;

pub use hashing::HashingEmbedder;
pub use openai_compat::{OpenAiCompatProvider, OpenAiEmbedder};
pub use retry::RetryingClient;

use ragdesk_config::{AppConfig, ConfigError};
use ragdesk_core::provider::CompletionClient;
use ragdesk_core::retrieval::EmbeddingProvider;
use std::sync::Arc;
use std::time::Duration;

/// Build the OpenAI-compatible HTTP client for the configured endpoint.
pub fn build_http_provider(config: &AppConfig) -> Result<Arc<OpenAiCompatProvider>, ConfigError> {
    let c = &config.completion;
    let api_key = config.require_api_key()?;
    let base_url = c
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&c.provider));

    Ok(Arc::new(OpenAiCompatProvider::with_timeout(
        &c.provider,
        base_url,
        api_key,
        Duration::from_secs(c.timeout_secs),
    )))
}

/// Build the completion client: the HTTP provider wrapped in bounded retry.
pub fn build_completion_client(config: &AppConfig) -> Result<Arc<dyn CompletionClient>, ConfigError> {
    let http = build_http_provider(config)?;
    Ok(Arc::new(RetryingClient::new(
        http,
        config.completion.max_retries,
        Duration::from_millis(config.completion.retry_backoff_ms),
    )))
}

/// Build the embedding provider named by `embedding.provider`.
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
    match config.embedding.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.embedding.dimensions))),
        "openai" => {
            let http = build_http_provider(config)?;
            Ok(Arc::new(OpenAiEmbedder::new(http, &config.embedding.model)))
        }
        other => Err(ConfigError::ValidationError(format!(
            "unknown embedding provider '{other}' (expected \"hashing\" or \"openai\")"
        ))),
    }
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
