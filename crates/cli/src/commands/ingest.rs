//! `ragdesk ingest` / `ragdesk clear-index`: Knowledge base management.

use std::path::{Path, PathBuf};

use ragdesk_config::AppConfig;
use ragdesk_core::retrieval::VectorIndex;
use ragdesk_index::{Ingestor, ParagraphChunker};
use tracing::warn;

use super::{CommandResult, open_index};

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// Expand directories (one level deep, sorted) into their text files.
fn collect_files(paths: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && is_text_file(p))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

pub async fn run(config: &AppConfig, paths: &[PathBuf]) -> CommandResult {
    let embedder = ragdesk_providers::build_embedder(config)?;
    let index = open_index(config)?;
    let ingestor = Ingestor::new(
        embedder,
        index.clone(),
        Box::new(ParagraphChunker::new(
            config.ingestion.chunk_size,
            config.ingestion.chunk_overlap,
        )),
    );

    println!("📥 Ingesting into {}", config.index_file().display());
    println!();

    let mut total_chunks = 0;
    let mut failures = 0;

    for file in collect_files(paths)? {
        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                println!("  ⚠️  {} (skipped: {e})", file.display());
                failures += 1;
                continue;
            }
        };

        let source = file.display().to_string();
        let report = ingestor.ingest_text(&source, &text).await?;
        println!("  ✅ {} ({} chunks)", report.source, report.chunks);
        total_chunks += report.chunks;
    }

    println!();
    println!(
        "  {total_chunks} chunks added, {} in the index.",
        index.count().await?
    );
    if failures > 0 {
        println!("  ⚠️  {failures} file(s) skipped.");
    }

    Ok(())
}

pub async fn clear(config: &AppConfig, confirm: bool) -> CommandResult {
    if !confirm {
        println!("⚠️  This will delete ALL documents in the knowledge base.");
        println!("   Run with --confirm to proceed:");
        println!("   ragdesk clear-index --confirm");
        return Ok(());
    }

    let index = open_index(config)?;
    let before = index.count().await?;
    index.clear().await?;
    println!("🗑️  Removed {before} chunks from {}.", config.index_file().display());

    Ok(())
}
