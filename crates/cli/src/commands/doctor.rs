//! `ragdesk doctor`: Diagnose configuration, index and endpoint health.

use std::path::Path;

use ragdesk_config::{AppConfig, ConfigError};
use ragdesk_core::provider::CompletionClient;
use ragdesk_core::retrieval::{EmbeddingProvider, VectorIndex};

use super::{CommandResult, open_index};

pub async fn run(config_path: &Path, loaded: Result<AppConfig, ConfigError>) -> CommandResult {
    println!("🩺 ragdesk Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file, using defaults — run `ragdesk onboard`");
        issues += 1;
    }

    let config = match loaded {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running other checks.");
            return Ok(());
        }
    };

    match config.require_api_key() {
        Ok(_) => println!("  ✅ Credentials available for '{}'", config.completion.provider),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    match ragdesk_providers::build_embedder(&config) {
        Ok(embedder) => println!("  ✅ Embedding provider: {}", embedder.name()),
        Err(e) => {
            println!("  ❌ Embedding provider: {e}");
            issues += 1;
        }
    }

    match open_index(&config) {
        Ok(index) => match index.count().await {
            Ok(0) => {
                println!("  ⚠️  Index is empty — run `ragdesk ingest <files>`");
                issues += 1;
            }
            Ok(n) => println!("  ✅ Index '{}' holds {n} chunks", config.index.collection),
            Err(e) => {
                println!("  ❌ Index unreadable: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if let Ok(provider) = ragdesk_providers::build_http_provider(&config) {
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Completion endpoint reachable: {}", provider.base_url()),
            Ok(false) | Err(_) => {
                println!("  ❌ Completion endpoint unreachable: {}", provider.base_url());
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
