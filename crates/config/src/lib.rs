//! Configuration loading, validation, and management for ragdesk.
//!
//! Loads configuration from `~/.ragdesk/config.toml` with environment
//! variable overrides. Validates all settings at startup; a configuration
//! error aborts startup instead of surfacing per query.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ragdesk/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion (and OpenAI embedding) endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Log prompts and configuration details at debug level
    #[serde(default)]
    pub debug: bool,

    /// Completion endpoint settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Confidence thresholds and top-k
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Conversation history settings
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Document chunking settings
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("debug", &self.debug)
            .field("completion", &self.completion)
            .field("embedding", &self.embedding)
            .field("index", &self.index)
            .field("retrieval", &self.retrieval)
            .field("conversation", &self.conversation)
            .field("ingestion", &self.ingestion)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// "openai", "openrouter", "ollama" or "custom"
    #[serde(default = "default_completion_provider")]
    pub provider: String,

    /// Base URL override (required for "custom")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Extra attempts after a rate-limit response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_completion_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_completion_provider(),
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "hashing" (offline) or "openai"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector length for the hashing embedder
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_provider() -> String {
    "hashing".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// "jsonl" or "memory"
    #[serde(default = "default_index_backend")]
    pub backend: String,

    /// Collection name; also the JSONL file stem
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Directory holding the index files (default `~/.ragdesk/index`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_index_backend() -> String {
    "jsonl".into()
}
fn default_collection() -> String {
    "msp_configs".into()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_index_backend(),
            collection: default_collection(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Below this best score, retrieval counts as a miss
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    #[serde(default = "default_high_threshold")]
    pub high_threshold: f32,

    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f32,
}

fn default_top_k() -> usize {
    5
}
fn default_min_score() -> f32 {
    0.2
}
fn default_high_threshold() -> f32 {
    0.5
}
fn default_medium_threshold() -> f32 {
    0.3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: default_min_score(),
            high_threshold: default_high_threshold(),
            medium_threshold: default_medium_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Messages kept per conversation, also the prompt history window
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_max_history() -> usize {
    10
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters carried over between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ragdesk/config.toml),
    /// then apply environment overrides.
    ///
    /// Recognised variables:
    /// - `RAGDESK_API_KEY` (highest priority), `OPENAI_API_KEY`
    /// - `OPENAI_MODEL`, `OPENAI_TEMPERATURE`, `OPENAI_MAX_TOKENS`
    /// - `MAX_CONVERSATION_HISTORY`
    /// - `RAGDESK_INDEX_PATH`, `RAGDESK_COLLECTION`
    /// - `DEBUG_MODE`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("RAGDESK_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(model) = lookup("OPENAI_MODEL") {
            self.completion.model = model;
        }
        if let Some(raw) = lookup("OPENAI_TEMPERATURE") {
            self.completion.temperature = parse_override("OPENAI_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("OPENAI_MAX_TOKENS") {
            self.completion.max_tokens = parse_override("OPENAI_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = lookup("MAX_CONVERSATION_HISTORY") {
            self.conversation.max_history = parse_override("MAX_CONVERSATION_HISTORY", &raw)?;
        }
        if let Some(path) = lookup("RAGDESK_INDEX_PATH") {
            self.index.path = Some(path);
        }
        if let Some(collection) = lookup("RAGDESK_COLLECTION") {
            self.index.collection = collection;
        }
        if let Some(raw) = lookup("DEBUG_MODE") {
            self.debug = raw.eq_ignore_ascii_case("true") || raw == "1";
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragdesk")
    }

    /// Directory holding the vector index files.
    pub fn index_dir(&self) -> PathBuf {
        match &self.index.path {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("index"),
        }
    }

    /// Path of the JSONL file backing the configured collection.
    pub fn index_file(&self) -> PathBuf {
        self.index_dir().join(format!("{}.jsonl", self.index.collection))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.completion;
        if c.temperature < 0.0 || c.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "completion.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "completion.max_tokens must be > 0".into(),
            ));
        }
        if c.provider == "custom" && c.api_url.is_none() {
            return Err(ConfigError::ValidationError(
                "completion.api_url is required for the custom provider".into(),
            ));
        }

        let r = &self.retrieval;
        if r.top_k == 0 {
            return Err(ConfigError::ValidationError("retrieval.top_k must be > 0".into()));
        }
        if !(r.min_score <= r.medium_threshold && r.medium_threshold <= r.high_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "retrieval thresholds must satisfy min_score ({}) <= medium_threshold ({}) <= high_threshold ({})",
                r.min_score, r.medium_threshold, r.high_threshold
            )));
        }

        // Turns are stored as user/assistant pairs; an odd bound would split one.
        let max_history = self.conversation.max_history;
        if max_history < 2 || max_history % 2 != 0 {
            return Err(ConfigError::ValidationError(format!(
                "conversation.max_history must be an even number >= 2, got {max_history}"
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be > 0".into(),
            ));
        }

        let i = &self.ingestion;
        if i.chunk_size == 0 || i.chunk_overlap >= i.chunk_size {
            return Err(ConfigError::ValidationError(
                "ingestion.chunk_overlap must be smaller than a non-zero chunk_size".into(),
            ));
        }

        Ok(())
    }

    /// Whether the completion provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        self.completion.provider != "ollama"
    }

    /// The API key, or a fatal startup error when the provider needs one.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ if !self.requires_api_key() => Ok(""),
            _ => Err(ConfigError::MissingCredential(
                "api_key is not set. Set RAGDESK_API_KEY or OPENAI_API_KEY, or add api_key to config.toml".into(),
            )),
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            debug: false,
            completion: CompletionConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
            conversation: ConversationConfig::default(),
            ingestion: IngestionConfig::default(),
        }
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} has an invalid value: {raw:?}")))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),
}
