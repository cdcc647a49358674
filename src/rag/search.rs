//! Chunk selection strategies.
//!
//! - **Keyword**: a chunk is relevant when any whitespace-separated query
//!   token appears in it, ignoring case.
//! - **Similarity**: a chunk is relevant when the raw dot product of its
//!   embedding with the query embedding exceeds a threshold.
//!
//! Relevance is boolean in both cases. Selected chunks keep corpus order and
//! there is no top-k cap.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rag::embeddings::EmbeddingClient;
use crate::types::{AppError, Chunk, Result};

/// Context substituted when no chunk qualifies.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";

/// Threshold used by the similarity strategy unless configured otherwise.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.6;

// ============================================================================
// Search Strategy Types
// ============================================================================

/// Available retrieval strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Case-insensitive substring match on query tokens
    #[default]
    Keyword,
    /// Raw dot product over embeddings against a fixed threshold
    Similarity,
}

impl FromStr for SearchStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "lexical" | "substring" => Ok(Self::Keyword),
            "similarity" | "semantic" | "dense" | "embedding" => Ok(Self::Similarity),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown search strategy: {}. Use: keyword, similarity",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Keyword => "keyword",
            Self::Similarity => "similarity",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Retrieval Result
// ============================================================================

/// Chunks selected for a query plus the context string built from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Selected chunks, in corpus order
    pub chunks: Vec<Chunk>,
    /// Chunk texts joined by `"\n"`, or [`NO_RELEVANT_INFORMATION`]
    pub context: String,
}

impl RetrievalResult {
    /// The result for a query nothing matched
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            context: NO_RELEVANT_INFORMATION.to_string(),
        }
    }

    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        if chunks.is_empty() {
            return Self::empty();
        }

        let context = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self { chunks, context }
    }

    /// True when nothing matched and `context` holds the sentinel.
    ///
    /// A real chunk whose text happens to equal the sentinel still counts as
    /// a match here.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Lowercased whitespace tokens of `query`
fn query_tokens(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn matches_any_token(tokens: &[String], text: &str) -> bool {
    let haystack = text.to_lowercase();
    tokens.iter().any(|t| haystack.contains(t.as_str()))
}

/// Whether any whitespace token of `query` occurs in `text`, ignoring case.
pub fn keyword_matches(query: &str, text: &str) -> bool {
    matches_any_token(&query_tokens(query), text)
}

/// Raw (unnormalized) dot product.
///
/// Vectors of different length are compared over their common prefix.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

// ============================================================================
// Retriever
// ============================================================================

/// Selects the chunks relevant to a query with one [`SearchStrategy`].
#[derive(Clone)]
pub struct Retriever {
    strategy: SearchStrategy,
    similarity_threshold: f32,
    embedder: Option<Arc<dyn EmbeddingClient>>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("strategy", &self.strategy)
            .field("similarity_threshold", &self.similarity_threshold)
            .field(
                "embedder",
                &self.embedder.as_ref().map(|e| e.model_name().to_string()),
            )
            .finish()
    }
}

impl Retriever {
    pub fn new(
        strategy: SearchStrategy,
        similarity_threshold: f32,
        embedder: Option<Arc<dyn EmbeddingClient>>,
    ) -> Self {
        Self {
            strategy,
            similarity_threshold,
            embedder,
        }
    }

    pub fn keyword() -> Self {
        Self::new(SearchStrategy::Keyword, DEFAULT_SIMILARITY_THRESHOLD, None)
    }

    pub fn similarity(embedder: Arc<dyn EmbeddingClient>, threshold: f32) -> Self {
        Self::new(SearchStrategy::Similarity, threshold, Some(embedder))
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    /// Select the chunks relevant to `query`.
    ///
    /// # Errors
    ///
    /// Similarity only: [`AppError::RetrievalUnavailable`] if the embedding
    /// service fails, [`AppError::Configuration`] if no embedder was given.
    pub async fn retrieve(&self, query: &str, chunks: &[Chunk]) -> Result<RetrievalResult> {
        let selected = match self.strategy {
            SearchStrategy::Keyword => self.select_by_keyword(query, chunks),
            SearchStrategy::Similarity => self.select_by_similarity(query, chunks).await?,
        };

        tracing::debug!(
            strategy = %self.strategy,
            total = chunks.len(),
            selected = selected.len(),
            "Chunks retrieved"
        );

        Ok(RetrievalResult::from_chunks(selected))
    }

    fn select_by_keyword(&self, query: &str, chunks: &[Chunk]) -> Vec<Chunk> {
        let tokens = query_tokens(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        chunks
            .iter()
            .filter(|chunk| matches_any_token(&tokens, &chunk.text))
            .cloned()
            .collect()
    }

    async fn select_by_similarity(&self, query: &str, chunks: &[Chunk]) -> Result<Vec<Chunk>> {
        let embedder = self.embedder.as_ref().ok_or_else(|| {
            AppError::Configuration("Similarity search requires an embedding client".to_string())
        })?;

        let query_embedding = embedder.embed(query).await?;

        let mut selected = Vec::new();
        // One request per chunk, issued in order.
        for chunk in chunks {
            let chunk_embedding = embedder.embed(&chunk.text).await?;
            if !chunk_embedding.is_empty()
                && !query_embedding.is_empty()
                && chunk_embedding.len() != query_embedding.len()
            {
                tracing::warn!(
                    chunk = chunk.index,
                    query_dims = query_embedding.len(),
                    chunk_dims = chunk_embedding.len(),
                    "Embedding dimensions differ"
                );
            }

            let score = dot_product(&query_embedding, &chunk_embedding);
            tracing::trace!(chunk = chunk.index, score, "Chunk scored");

            if score > self.similarity_threshold {
                selected.push(chunk.clone());
            }
        }

        Ok(selected)
    }
}
