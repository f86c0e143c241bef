//! In-memory index: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use ragdesk_core::error::RetrievalError;
use ragdesk_core::retrieval::{IndexedDocument, SearchHit, VectorIndex};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::vector::{check_dimensions, rank_by_similarity};

/// An index that keeps every chunk in a Vec and scans it on query.
pub struct InMemoryIndex {
    documents: Arc<RwLock<Vec<IndexedDocument>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn add(&self, documents: Vec<IndexedDocument>) -> Result<usize, RetrievalError> {
        let added = documents.len();
        self.documents.write().await.extend(documents);
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
        self.documents.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_index_returns_no_hits() {
        let index = InMemoryIndex::new();
        let hits = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn add_and_query() {
        let index = InMemoryIndex::new();
        index
            .add(vec![
                IndexedDocument::new("VPN setup guide", vec![1.0, 0.0]),
                IndexedDocument::new("Printer driver install", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = index.query(&[0.9, 0.1], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "VPN setup guide");
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn clear_all() {
        let index = InMemoryIndex::new();
        index
            .add(vec![IndexedDocument::new("a", vec![1.0])])
            .await
            .unwrap();
        index.clear().await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
    }
}
