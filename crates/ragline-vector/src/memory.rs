use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use ragline_core::{DocId, Document, Embedding, Error, IndexGateway, Meta, Result, RetrievalResult, RetrievedDocument};

use crate::validate::{check_dimension, next_free_ids, validate_add, validate_top_k};

/// In-process index with brute-force cosine search.
///
/// Nothing is persisted. Suitable for tests and short-lived sessions; the id
/// counter keeps increasing across `clear` so ids are never reused.
#[derive(Default)]
pub struct MemoryIndex {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    entries: Vec<(Document, Embedding)>,
    dim: Option<usize>,
    next_id: u64,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl IndexGateway for MemoryIndex {
    async fn add(
        &self,
        texts: &[String],
        embeddings: &[Embedding],
        ids: Option<&[DocId]>,
        metadata: Option<&[Meta]>,
    ) -> Result<Vec<DocId>> {
        let Some(dim) = validate_add(texts, embeddings, ids, metadata)? else {
            return Ok(Vec::new());
        };
        let mut state = self.state.write().await;
        if let Some(expected) = state.dim {
            check_dimension(expected, dim, "embedding")?;
        }

        let ids = match ids {
            Some(ids) => {
                if let Some(dup) = ids.iter().find(|id| state.entries.iter().any(|(d, _)| &d.id == *id)) {
                    return Err(Error::invalid_argument(format!("document id '{dup}' already exists")));
                }
                ids.to_vec()
            }
            None => {
                let taken: HashSet<&str> = state.entries.iter().map(|(d, _)| d.id.as_str()).collect();
                let (ids, next) = next_free_ids(state.next_id, texts.len(), |id| taken.contains(id));
                state.next_id = next;
                ids
            }
        };

        for (i, (text, embedding)) in texts.iter().zip(embeddings).enumerate() {
            let meta = metadata.map(|m| m[i].clone()).unwrap_or_default();
            let doc = Document::new(ids[i].clone(), text.clone()).with_metadata(meta);
            state.entries.push((doc, embedding.clone()));
        }
        state.dim = Some(dim);
        tracing::debug!(target: "index", backend = "memory", "added {} documents (total {})", ids.len(), state.entries.len());
        Ok(ids)
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<RetrievalResult> {
        validate_top_k(top_k)?;
        let state = self.state.read().await;
        let Some(dim) = state.dim else {
            return Ok(RetrievalResult::default());
        };
        check_dimension(dim, query.len(), "query vector")?;

        let mut scored: Vec<(f32, &Document)> = state
            .entries
            .iter()
            .map(|(doc, emb)| (cosine_similarity(query, emb), doc))
            .collect();
        // Higher is better; ties keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(RetrievalResult::new(
            scored
                .into_iter()
                .take(top_k)
                .map(|(score, doc)| RetrievedDocument { document: doc.clone(), score })
                .collect(),
        ))
    }

    async fn list(&self) -> Result<Vec<Document>> {
        Ok(self.state.read().await.entries.iter().map(|(d, _)| d.clone()).collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.dim = None;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.entries.len())
    }
}
