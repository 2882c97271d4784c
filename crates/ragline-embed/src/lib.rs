//! Embedding gateway implementations.
//!
//! [`OllamaEmbedder`] talks to the embedding service over HTTP;
//! [`HashEmbedder`] is a deterministic offline stand-in for tests and
//! development (`embedding.use_fake = true`).

mod hash;
mod ollama;

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

use ragline_core::config::Settings;
use ragline_core::{EmbeddingGateway, Result};

pub fn get_default_embedder(settings: &Settings) -> Result<Box<dyn EmbeddingGateway>> {
    if settings.embedding.use_fake {
        tracing::info!(target: "embed", dim = settings.embedding.fake_dim, "using HashEmbedder");
        return Ok(Box::new(HashEmbedder::new(settings.embedding.fake_dim)));
    }
    Ok(Box::new(OllamaEmbedder::new(&settings.service, &settings.embedding)?))
}
