//! Shared building blocks of the ragline pipeline: domain types, the error
//! taxonomy, gateway traits, configuration, chunking, and source loading.

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{Chunker, ChunkingConfig};
pub use error::{Error, Result};
pub use traits::{EmbeddingGateway, GenerationGateway, IndexGateway};
pub use types::{preview, DocId, Document, Embedding, Meta, RetrievalResult, RetrievedDocument, SourceText};
