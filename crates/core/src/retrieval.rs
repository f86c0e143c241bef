//! Retrieval traits: the embedding provider and the vector index.
//!
//! Both are external collaborators of the routing engine. The index stores
//! pre-chunked documents together with their embedding and answers top-k
//! nearest-neighbour queries.
//!
//! Scores returned by [`VectorIndex::query`] are similarities: higher is better.
//! They are not required to lie in `[0, 1]`; routing thresholds are tuned to
//! whatever scale the configured index produces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A document chunk as stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Unique ID for this chunk
    pub id: String,

    /// The raw chunk text
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,

    /// Free-form metadata (source file, chunk position, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// When this chunk was added
    pub added_at: DateTime<Utc>,
}

impl IndexedDocument {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            embedding,
            metadata: serde_json::Map::new(),
            added_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// One nearest-neighbour result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The chunk text
    pub text: String,

    /// Similarity to the query (higher is better)
    pub score: f32,
}

impl SearchHit {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Maps text to a fixed-length vector.
///
/// Must be deterministic for identical input within a process lifetime.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// A human-readable name (e.g., "openai", "hashing").
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError>;

    /// Embed several texts. The default implementation embeds them one by one.
    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, RetrievalError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// The vector store.
///
/// Implementations: in-memory (tests, ephemeral sessions), JSONL file.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// The backend name (e.g., "in_memory", "jsonl").
    fn name(&self) -> &str;

    /// Store document chunks. Returns the number stored.
    async fn add(&self, documents: Vec<IndexedDocument>) -> std::result::Result<usize, RetrievalError>;

    /// Top-k nearest documents in descending score order.
    /// Returns an empty list when the index is empty.
    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> std::result::Result<Vec<SearchHit>, RetrievalError>;

    /// Number of stored chunks.
    async fn count(&self) -> std::result::Result<usize, RetrievalError>;

    /// Remove every stored chunk.
    async fn clear(&self) -> std::result::Result<(), RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ConstantEmbedder {
        fn name(&self) -> &str {
            "constant"
        }

        async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
            if text.is_empty() {
                return Err(RetrievalError::Embedding("empty input".into()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn default_batch_embeds_in_order() {
        let texts = vec!["a".to_string(), "abc".to_string()];
        let vectors = ConstantEmbedder.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 1.0], vec![3.0, 1.0]]);
    }

    #[tokio::test]
    async fn default_batch_stops_on_first_error() {
        let texts = vec!["ok".to_string(), String::new()];
        let err = ConstantEmbedder.embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Embedding(_)));
    }

    #[test]
    fn indexed_document_metadata() {
        let doc = IndexedDocument::new("Reset a password via the portal", vec![0.1, 0.2])
            .with_metadata("source", serde_json::json!("passwords.txt"));
        assert!(!doc.id.is_empty());
        assert_eq!(doc.metadata["source"], "passwords.txt");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("passwords.txt"));
    }
}
