//! Document ingestion: chunk, embed, index.

use chrono::Utc;
use ragdesk_core::error::RetrievalError;
use ragdesk_core::retrieval::{EmbeddingProvider, IndexedDocument, VectorIndex};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::chunker::Chunker;

/// Outcome of ingesting one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    pub chunks: usize,
}

/// Feeds plain-text documents into a vector index.
pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: Box<dyn Chunker>,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chunker: Box<dyn Chunker>,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker,
        }
    }

    /// Chunk `text`, embed every chunk and add the chunks to the index tagged
    /// with `source`.
    pub async fn ingest_text(
        &self,
        source: &str,
        text: &str,
    ) -> Result<IngestReport, RetrievalError> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Ok(IngestReport {
                source: source.to_string(),
                chunks: 0,
            });
        }

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let total = chunks.len();
        let ingested_at = Utc::now().to_rfc3339();
        let documents: Vec<IndexedDocument> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (chunk, embedding))| {
                IndexedDocument::new(chunk, embedding)
                    .with_metadata("source", json!(source))
                    .with_metadata("chunk_index", json!(i))
                    .with_metadata("total_chunks", json!(total))
                    .with_metadata("ingested_at", json!(ingested_at))
            })
            .collect();

        let added = self.index.add(documents).await?;
        info!(source, chunks = added, index = self.index.name(), "Document ingested");

        Ok(IngestReport {
            source: source.to_string(),
            chunks: added,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ParagraphChunker;
    use crate::in_memory::InMemoryIndex;
    use async_trait::async_trait;

    /// Embeds by text length so tests don't need a real model.
    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        fn name(&self) -> &str {
            "length"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Err(RetrievalError::Embedding("model unavailable".into()))
        }
    }

    #[tokio::test]
    async fn ingests_all_chunks() {
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(
            Arc::new(LengthEmbedder),
            index.clone(),
            Box::new(ParagraphChunker::new(30, 10)),
        );

        let report = ingestor
            .ingest_text(
                "kb/notes.txt",
                "alpha one\n\nbeta two\n\ngamma three\n\ndelta four",
            )
            .await
            .unwrap();

        assert_eq!(report.source, "kb/notes.txt");
        assert_eq!(report.chunks, 3);
        assert_eq!(index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn empty_document_adds_nothing() {
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(
            Arc::new(LengthEmbedder),
            index.clone(),
            Box::new(ParagraphChunker::default()),
        );
        let report = ingestor.ingest_text("empty.txt", "  ").await.unwrap();
        assert_eq!(report.chunks, 0);
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn embedding_failure_leaves_index_untouched() {
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(
            Arc::new(FailingEmbedder),
            index.clone(),
            Box::new(ParagraphChunker::default()),
        );
        let result = ingestor.ingest_text("a.txt", "Reset your password").await;
        assert!(matches!(result, Err(RetrievalError::Embedding(_))));
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn chunks_carry_source_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.jsonl");
        let index = Arc::new(crate::jsonl::JsonlIndex::open(path.clone()));
        let ingestor = Ingestor::new(
            Arc::new(LengthEmbedder),
            index,
            Box::new(ParagraphChunker::default()),
        );
        ingestor
            .ingest_text("vpn.txt", "Connect to the VPN before mapping drives.")
            .await
            .unwrap();

        let line = std::fs::read_to_string(path).unwrap();
        let doc: IndexedDocument = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(doc.metadata["source"], "vpn.txt");
        assert_eq!(doc.metadata["chunk_index"], 0);
        assert_eq!(doc.metadata["total_chunks"], 1);
        assert!(doc.metadata.contains_key("ingested_at"));
    }
}
