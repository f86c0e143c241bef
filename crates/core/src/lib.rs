//! # ragdesk core
//!
//! Domain types, collaborator traits, and error definitions for the ragdesk
//! retrieval-augmented question answering pipeline.
//!
//! The embedding model, the vector index and the completion endpoint are all
//! external collaborators. Each one is a trait here; implementations live in
//! `ragdesk-providers` and `ragdesk-index`, and the routing engine in
//! `ragdesk-engine` only ever sees the traits.

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{CompletionError, CompletionFailureKind, Error, Result, RetrievalError};
pub use message::{ConversationId, Message, Role};
pub use provider::{CompletionClient, CompletionRequest, CompletionResponse, Usage};
pub use retrieval::{EmbeddingProvider, IndexedDocument, SearchHit, VectorIndex};
