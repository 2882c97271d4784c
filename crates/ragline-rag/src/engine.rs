use ragline_core::{
    preview, Chunker, DocId, Document, Embedding, EmbeddingGateway, Error, GenerationGateway, IndexGateway, Meta,
    Result, RetrievalResult, SourceText,
};

use crate::prompt::{build_context, build_prompt, FALLBACK_ANSWER};

const DEBUG_PREVIEW_CHARS: usize = 100;

/// A generated answer together with the documents it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: RetrievalResult,
    /// `false` when retrieval came back empty and `text` is the fallback.
    pub grounded: bool,
}

/// Ties chunking, embedding, indexing, and generation together.
///
/// The embedder is boxed so it can be picked at runtime from settings; the
/// index and generator are generic.
pub struct RagEngine<I, G>
where
    I: IndexGateway,
    G: GenerationGateway,
{
    embedder: Box<dyn EmbeddingGateway>,
    index: I,
    generator: G,
    chunker: Chunker,
}

impl<I, G> RagEngine<I, G>
where
    I: IndexGateway,
    G: GenerationGateway,
{
    pub fn new(embedder: Box<dyn EmbeddingGateway>, index: I, generator: G) -> Self {
        Self { embedder, index, generator, chunker: Chunker::default() }
    }

    #[must_use]
    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn embedder(&self) -> &dyn EmbeddingGateway {
        self.embedder.as_ref()
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Index each text as one document, without chunking.
    pub async fn add_documents(&self, texts: &[String]) -> Result<usize> {
        self.embed_and_add(texts, None).await
    }

    /// Chunk every source and index all chunks of the call in one batch.
    ///
    /// Each chunk inherits its source's metadata plus `chunk_index` and
    /// `total_chunks`. Returns the number of chunks indexed.
    pub async fn ingest(&self, sources: &[SourceText]) -> Result<usize> {
        let mut texts = Vec::new();
        let mut metadata = Vec::new();
        for source in sources {
            let chunks = self.chunker.chunk(&source.text);
            let total = chunks.len();
            for (i, chunk) in chunks.into_iter().enumerate() {
                let mut meta: Meta = source.metadata.clone();
                meta.insert("chunk_index".to_string(), i.to_string());
                meta.insert("total_chunks".to_string(), total.to_string());
                texts.push(chunk);
                metadata.push(meta);
            }
        }
        tracing::info!(target: "rag", "ingesting {} sources as {} chunks", sources.len(), texts.len());
        self.embed_and_add(&texts, Some(&metadata)).await
    }

    async fn embed_and_add(&self, texts: &[String], metadata: Option<&[Meta]>) -> Result<usize> {
        if texts.is_empty() {
            return Ok(0);
        }
        let embeddings: Vec<Embedding> = self.embedder.embed_batch(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "embedder returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        let ids: Vec<DocId> = self.index.add(texts, &embeddings, None, metadata).await?;
        tracing::debug!(target: "rag", embedder = self.embedder.embedder_id(), "indexed {} documents", ids.len());
        Ok(ids.len())
    }

    /// Answer `question` from the `top_k` nearest documents.
    ///
    /// With nothing retrieved the fixed [`FALLBACK_ANSWER`] is returned and
    /// the generator is not called.
    pub async fn query(&self, question: &str, top_k: usize, debug: bool) -> Result<String> {
        Ok(self.query_with_sources(question, top_k, debug).await?.text)
    }

    pub async fn query_with_sources(&self, question: &str, top_k: usize, debug: bool) -> Result<Answer> {
        if top_k == 0 {
            return Err(Error::invalid_argument("top_k must be at least 1"));
        }
        let query_vector = self.embedder.embed(question).await?;
        let sources = self.index.search(&query_vector, top_k).await?;

        if debug {
            tracing::debug!(target: "rag", "search results: {:?}", sources);
            tracing::debug!(target: "rag", "found {} documents", sources.len());
            for (i, hit) in sources.items.iter().enumerate() {
                tracing::debug!(
                    target: "rag",
                    score = hit.score,
                    "Doc {}: {}",
                    i + 1,
                    preview(&hit.document.text, DEBUG_PREVIEW_CHARS)
                );
            }
        }

        if sources.is_empty() {
            tracing::info!(target: "rag", "no documents retrieved; returning fallback answer");
            return Ok(Answer { text: FALLBACK_ANSWER.to_string(), sources, grounded: false });
        }

        let prompt = build_prompt(&build_context(&sources), question);
        let text = self.generator.generate(&prompt).await?;
        tracing::debug!(target: "rag", model = self.generator.model(), "answered from {} documents", sources.len());
        Ok(Answer { text, sources, grounded: true })
    }

    pub async fn count(&self) -> Result<usize> {
        self.index.count().await
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        self.index.list().await
    }

    pub async fn clear(&self) -> Result<()> {
        self.index.clear().await
    }
}
