//! Domain types shared by the gateways and the orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = String;
pub type Meta = BTreeMap<String, String>;
pub type Embedding = Vec<f32>;

/// A stored retrieval unit.
///
/// - `id`: unique within its collection, assigned by the caller or the index
/// - `text`: the payload that is embedded and later quoted to the generator
/// - `metadata`: free-form string attributes (e.g. `source`, `chunk_index`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub metadata: Meta,
}

impl Document {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Meta::new() }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Meta) -> Self {
        self.metadata = metadata;
        self
    }

    /// First `max_chars` characters of the text, with `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.text, max_chars)
    }
}

/// Truncate on a char boundary so multi-byte text never panics.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One hit of a vector search. `score` is higher-is-better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document: Document,
    pub score: f32,
}

/// Ranked hits, nearest first, never longer than the requested `top_k`.
///
/// An empty `items` is the "nothing found" signal; there is no separate flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub items: Vec<RetrievedDocument>,
}

impl RetrievalResult {
    pub fn new(items: Vec<RetrievedDocument>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.items.iter().map(|hit| &hit.document)
    }
}

/// Raw text plus the attributes it should carry into the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceText {
    pub text: String,
    pub metadata: Meta,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: Meta::new() }
    }

    /// Tag the text with where it came from (file path, URL, ...).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.insert("source".to_string(), source.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundary() {
        let doc = Document::new("doc_0", "온톨로지는 지식 체계입니다");
        assert_eq!(doc.preview(5), "온톨로지는...");
        assert_eq!(doc.preview(100), "온톨로지는 지식 체계입니다");
    }

    #[test]
    fn retrieval_result_exposes_documents_in_order() {
        let result = RetrievalResult::new(vec![
            RetrievedDocument { document: Document::new("a", "first"), score: 0.9 },
            RetrievedDocument { document: Document::new("b", "second"), score: 0.5 },
        ]);
        let ids: Vec<&str> = result.documents().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
    }
}
