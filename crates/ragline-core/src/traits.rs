use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DocId, Document, Embedding, Meta, RetrievalResult};

/// Maps text to fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `ollama:mxbai-embed-large`).
    fn embedder_id(&self) -> &str;

    /// Vector dimension when known up front; remote models report `None`.
    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// One vector per input, in input order. Any failing item fails the call.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Stores `(id, text, vector, metadata)` tuples and answers nearest-neighbour queries.
#[async_trait]
pub trait IndexGateway: Send + Sync {
    /// Adds one entry per text and returns the ids they were stored under.
    ///
    /// `texts`, `embeddings`, and (when given) `ids`/`metadata` must have equal
    /// lengths. Omitted ids are drawn from the collection's own counter.
    async fn add(
        &self,
        texts: &[String],
        embeddings: &[Embedding],
        ids: Option<&[DocId]>,
        metadata: Option<&[Meta]>,
    ) -> Result<Vec<DocId>>;

    /// Up to `top_k` entries, nearest first. `top_k` must be at least 1.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<RetrievalResult>;

    /// Every stored document, in insertion order where the backend preserves it.
    async fn list(&self) -> Result<Vec<Document>>;

    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;
}

/// Prompt in, full completion out. No streaming.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
