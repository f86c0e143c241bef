//! File-based index: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `IndexedDocument` (text, embedding, metadata).
//! Storage location: `~/.ragdesk/index/<collection>.jsonl` by default.

use async_trait::async_trait;
use ragdesk_core::error::RetrievalError;
use ragdesk_core::retrieval::{IndexedDocument, SearchHit, VectorIndex};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::vector::{check_dimensions, rank_by_similarity};

/// A file-backed index using JSONL (one document per line).
///
/// Documents are loaded into memory on creation and flushed to disk on every
/// mutation (add, clear).
pub struct JsonlIndex {
    path: PathBuf,
    documents: Arc<RwLock<Vec<IndexedDocument>>>,
}

impl JsonlIndex {
    /// Open the index at the given path.
    ///
    /// If the file exists, documents are loaded from it.
    /// If the file does not exist, starts empty (file created on first write).
    pub fn open(path: PathBuf) -> Self {
        let documents = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = documents.len(), "JSONL index loaded");
        Self {
            path,
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load documents from a JSONL file.
    fn load_from_disk(path: &Path) -> Vec<IndexedDocument> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet, start empty
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<IndexedDocument>(line) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted index line");
                    None
                }
            })
            .collect()
    }

    /// Write all documents to disk as JSONL.
    fn flush(&self, documents: &[IndexedDocument]) -> Result<(), RetrievalError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RetrievalError::Index(format!("Failed to create index directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for doc in documents {
            let line = serde_json::to_string(doc).map_err(|e| {
                RetrievalError::Index(format!("Failed to serialize document: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| RetrievalError::Index(format!("Failed to write index file: {e}")))
    }
}

#[async_trait]
impl VectorIndex for JsonlIndex {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn add(&self, new_documents: Vec<IndexedDocument>) -> Result<usize, RetrievalError> {
        let added = new_documents.len();
        let mut documents = self.documents.write().await;
        documents.extend(new_documents);
        if let Err(e) = self.flush(&documents) {
            // Keep memory and disk in agreement.
            let keep = documents.len() - added;
            documents.truncate(keep);
            return Err(e);
        }
        Ok(added)
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        let documents = self.documents.read().await;
        check_dimensions(&documents, embedding)?;
        Ok(rank_by_similarity(&documents, embedding, k))
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.documents.read().await.len())
    }

    async fn clear(&self) -> Result<(), RetrievalError> {
        let mut documents = self.documents.write().await;
        let previous = std::mem::take(&mut *documents);
        if let Err(e) = self.flush(&documents) {
            *documents = previous;
            return Err(e);
        }
        Ok(())
    }
}
