//! Embedding index over the loaded chunks.
//!
//! Chunk `i` and embedding `i` always describe the same text. The index is
//! immutable once built; a new corpus means a new `build`.

use std::sync::Arc;

use crate::corpus::Chunk;
use crate::core::errors::AssistantError;
use crate::embedding::Embedder;

pub struct EmbeddingIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingIndex {
    /// Embeds every chunk in a single batch call.
    ///
    /// Any mismatch between the batch result and the chunk list is fatal.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AssistantError> {
        if chunks.is_empty() {
            tracing::warn!("Building an empty index; every query will find nothing");
            return Ok(Self {
                chunks,
                embeddings: Vec::new(),
                embedder,
            });
        }

        tracing::info!(
            "Creating embeddings for {} chunks with '{}'",
            chunks.len(),
            embedder.name()
        );
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(AssistantError::Embedding(format!(
                "batch returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        let dimension = embedder.dimension();
        if let Some((position, vector)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimension)
        {
            return Err(AssistantError::Embedding(format!(
                "vector {position} has dimension {} (expected {dimension})",
                vector.len()
            )));
        }

        tracing::info!("Embeddings ready");
        Ok(Self {
            chunks,
            embeddings,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// The embedder the index was built with; queries must use the same one.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}
