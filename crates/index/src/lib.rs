//! Vector index backends and document ingestion for ragdesk.

pub mod chunker;
pub mod in_memory;
pub mod ingest;
pub mod jsonl;
pub mod vector;

pub use chunker::{Chunker, ParagraphChunker};
pub use in_memory::InMemoryIndex;
pub use ingest::{IngestReport, Ingestor};
pub use jsonl::JsonlIndex;
pub use vector::{check_dimensions, cosine_similarity, rank_by_similarity};
