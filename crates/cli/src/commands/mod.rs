//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod history;
pub mod ingest;
pub mod onboard;
pub mod sessions;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ragdesk_config::{AppConfig, ConfigError};
use ragdesk_core::retrieval::VectorIndex;
use ragdesk_engine::{ConversationStore, GenerationSettings, QaService, RetrievalRouter, RouterConfig};
use ragdesk_index::{InMemoryIndex, JsonlIndex};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// The config file to use: the `--config` flag, else `~/.ragdesk/config.toml`.
pub fn config_path(flag: Option<&Path>) -> PathBuf {
    match flag {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    AppConfig::load_with_env(path)
}

/// Open the vector index named by `index.backend`.
pub fn open_index(config: &AppConfig) -> Result<Arc<dyn VectorIndex>, ConfigError> {
    match config.index.backend.as_str() {
        "jsonl" => Ok(Arc::new(JsonlIndex::open(config.index_file()))),
        "memory" => Ok(Arc::new(InMemoryIndex::new())),
        other => Err(ConfigError::ValidationError(format!(
            "unknown index backend '{other}' (expected \"jsonl\" or \"memory\")"
        ))),
    }
}

/// Wire up the full question-answering pipeline from configuration.
///
/// Fails fast on configuration problems such as a missing API key.
pub fn build_service(
    config: &AppConfig,
    store: Arc<ConversationStore>,
) -> Result<QaService, ConfigError> {
    let embedder = ragdesk_providers::build_embedder(config)?;
    let index = open_index(config)?;
    let client = ragdesk_providers::build_completion_client(config)?;

    let router = RetrievalRouter::new(embedder, index, RouterConfig::from(config));
    Ok(QaService::new(
        router,
        client,
        store,
        GenerationSettings::from(&config.completion),
    ))
}
