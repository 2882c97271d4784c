//! Argument checks shared by every index backend.

use std::collections::HashSet;

use ragline_core::{DocId, Embedding, Error, Meta, Result};

/// Checks the shape of an `add` call and returns the common vector dimension.
///
/// Returns `Ok(None)` for an empty batch.
pub fn validate_add(
    texts: &[String],
    embeddings: &[Embedding],
    ids: Option<&[DocId]>,
    metadata: Option<&[Meta]>,
) -> Result<Option<usize>> {
    if texts.len() != embeddings.len() {
        return Err(Error::invalid_argument(format!(
            "got {} documents but {} embeddings",
            texts.len(),
            embeddings.len()
        )));
    }
    if let Some(ids) = ids {
        if ids.len() != texts.len() {
            return Err(Error::invalid_argument(format!("got {} documents but {} ids", texts.len(), ids.len())));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if id.is_empty() {
                return Err(Error::invalid_argument("document ids must not be empty"));
            }
            if !seen.insert(id.as_str()) {
                return Err(Error::invalid_argument(format!("duplicate document id '{id}' in batch")));
            }
        }
    }
    if let Some(metadata) = metadata {
        if metadata.len() != texts.len() {
            return Err(Error::invalid_argument(format!(
                "got {} documents but {} metadata entries",
                texts.len(),
                metadata.len()
            )));
        }
    }

    let Some(first) = embeddings.first() else {
        return Ok(None);
    };
    let dim = first.len();
    if dim == 0 {
        return Err(Error::invalid_argument("embeddings must not be empty"));
    }
    if let Some(pos) = embeddings.iter().position(|e| e.len() != dim) {
        return Err(Error::invalid_argument(format!(
            "embedding {pos} has dimension {} but the batch uses {dim}",
            embeddings[pos].len()
        )));
    }
    Ok(Some(dim))
}

pub fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::invalid_argument("top_k must be at least 1"));
    }
    Ok(())
}

/// Collection dimension must match once it is established.
pub fn check_dimension(expected: usize, actual: usize, what: &str) -> Result<()> {
    if expected != actual {
        return Err(Error::invalid_argument(format!(
            "{what} has dimension {actual} but the collection stores {expected}"
        )));
    }
    Ok(())
}

/// Ids for `count` new documents starting at the collection counter value `next`.
pub fn sequential_ids(next: u64, count: usize) -> Vec<DocId> {
    (next..next + count as u64).map(|n| format!("doc_{n}")).collect()
}

/// Like [`sequential_ids`], but skips counter values whose id is already
/// taken (e.g. a caller stored `doc_0` explicitly). Returns the ids and the
/// advanced counter.
pub fn next_free_ids(mut next: u64, count: usize, mut is_taken: impl FnMut(&str) -> bool) -> (Vec<DocId>, u64) {
    let mut ids = Vec::with_capacity(count);
    while ids.len() < count {
        let id = format!("doc_{next}");
        next += 1;
        if !is_taken(&id) {
            ids.push(id);
        }
    }
    (ids, next)
}
