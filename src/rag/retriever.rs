use serde::{Deserialize, Serialize};

use super::index::EmbeddingIndex;
use crate::corpus::Chunk;
use crate::core::errors::AssistantError;
use crate::vector_math::rank_descending_by_cosine;

pub const DEFAULT_TOP_K: usize = 3;

/// A chunk paired with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Returns up to `top_k` chunks by descending similarity to `query`.
///
/// Ties keep corpus order. An empty index returns nothing without embedding
/// the query; `top_k` beyond the corpus size returns every chunk.
pub async fn search(
    index: &EmbeddingIndex,
    query: &str,
    top_k: usize,
) -> Result<Vec<ScoredChunk>, AssistantError> {
    if index.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }

    let query_embedding = index
        .embedder()
        .embed(&[query.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::Embedding("query embedding missing".to_string()))?;

    let ranked = rank_descending_by_cosine(&query_embedding, index.embeddings())?;
    let results: Vec<ScoredChunk> = ranked
        .into_iter()
        .take(top_k)
        .map(|(idx, score)| ScoredChunk {
            chunk: index.chunks()[idx].clone(),
            score,
        })
        .collect();

    tracing::debug!(
        "Query {:?} matched {} chunks (top score {:?})",
        query,
        results.len(),
        results.first().map(|r| r.score)
    );
    Ok(results)
}
