//! Sentence embedding capabilities.
//!
//! - `SentenceEmbedder`: local pretrained model (default `all-MiniLM-L6-v2`)
//! - `OpenAiEmbedder`: any OpenAI-compatible `/v1/embeddings` endpoint

mod openai;
mod provider;
mod sentence;

use std::path::PathBuf;
use std::sync::Arc;

pub use openai::OpenAiEmbedder;
pub use provider::Embedder;
pub use sentence::{SentenceEmbedder, DEFAULT_MODEL};

use crate::core::config::{EmbeddingProviderKind, EmbeddingSettings};
use crate::core::errors::AssistantError;

/// Builds the embedder selected by configuration.
///
/// Loading a local model blocks and may download it.
pub fn from_settings(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>, AssistantError> {
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProviderKind::FastEmbed => Arc::new(SentenceEmbedder::load(
            &settings.model,
            settings.cache_dir.as_ref().map(PathBuf::from),
        )?),
        EmbeddingProviderKind::OpenAi => Arc::new(OpenAiEmbedder::new(
            settings.base_url.clone(),
            settings.model.clone(),
            settings.dimension,
        )),
    };
    Ok(embedder)
}
