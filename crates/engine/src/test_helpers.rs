//! Shared test doubles for engine tests.

use async_trait::async_trait;
use ragdesk_core::error::{CompletionError, RetrievalError};
use ragdesk_core::provider::{CompletionClient, CompletionRequest, CompletionResponse, Usage};
use ragdesk_core::retrieval::{EmbeddingProvider, IndexedDocument, SearchHit, VectorIndex};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An embedder that records its inputs and returns a constant vector.
pub struct CountingEmbedder {
    fail: bool,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn name(&self) -> &str {
        "counting"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(text.to_string());
        if self.fail {
            return Err(RetrievalError::Embedding("embedding model offline".into()));
        }
        Ok(vec![1.0, 0.0, 0.0])
    }
}

/// An index that answers every query with a fixed, pre-ranked hit list.
pub struct ScriptedIndex {
    hits: Vec<SearchHit>,
    fail: bool,
    queries: AtomicUsize,
    last_k: Mutex<Option<usize>>,
}

impl ScriptedIndex {
    pub fn with_hits(hits: Vec<(&str, f32)>) -> Self {
        Self {
            hits: hits
                .into_iter()
                .map(|(text, score)| SearchHit::new(text, score))
                .collect(),
            fail: false,
            queries: AtomicUsize::new(0),
            last_k: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn last_k(&self) -> Option<usize> {
        *self.last_k.lock().unwrap()
    }
}

#[async_trait]
impl VectorIndex for ScriptedIndex {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn add(&self, documents: Vec<IndexedDocument>) -> Result<usize, RetrievalError> {
        Ok(documents.len())
    }

    async fn query(&self, _embedding: &[f32], k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_k.lock().unwrap() = Some(k);
        if self.fail {
            return Err(RetrievalError::Index("collection unavailable".into()));
        }
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.hits.len())
    }

    async fn clear(&self) -> Result<(), RetrievalError> {
        Ok(())
    }
}

/// A completion client that returns one scripted outcome on every call and
/// keeps the last request for inspection.
pub struct MockClient {
    outcome: Result<String, CompletionError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockClient {
    pub fn replying(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(error: CompletionError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let model = request.model.clone();
        *self.last_request.lock().unwrap() = Some(request);
        let content = self.outcome.clone()?;
        Ok(CompletionResponse {
            content,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}
