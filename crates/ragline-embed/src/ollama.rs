use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use ragline_core::config::{EmbeddingSettings, ServiceSettings};
use ragline_core::{Embedding, EmbeddingGateway, Error, Result};

/// Embedding gateway backed by an Ollama-compatible `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    id: String,
    concurrency: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Option<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(service: &ServiceSettings, embedding: &EmbeddingSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(service.timeout())
            .build()
            .map_err(|e| Error::embedding(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/embeddings", service.base_url.trim_end_matches('/')),
            model: embedding.model.clone(),
            id: format!("ollama:{}", embedding.model),
            concurrency: embedding.concurrency.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingGateway for OllamaEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let request = EmbeddingRequest { model: &self.model, prompt: text };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::embedding(format!("request to {} timed out", self.endpoint))
                } else {
                    Error::embedding(format!("request to {} failed: {e}", self.endpoint))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("HTTP {status}: {body}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse response: {e}")))?;
        match parsed.embedding {
            Some(vector) if !vector.is_empty() => Ok(vector),
            Some(_) => Err(Error::embedding("response carried an empty `embedding` vector")),
            None => Err(Error::embedding("response is missing the `embedding` field")),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let start = Instant::now();
        // `buffered` keeps output order equal to input order regardless of completion order.
        let requests: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        let vectors: Vec<Embedding> = futures::stream::iter(requests)
            .buffered(self.concurrency)
            .try_collect()
            .await?;
        tracing::debug!(
            target: "embed",
            model = %self.model,
            "embedded {} texts in {} ms",
            vectors.len(),
            start.elapsed().as_millis()
        );
        Ok(vectors)
    }
}
