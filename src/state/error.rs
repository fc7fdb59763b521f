use thiserror::Error;

use crate::core::errors::AssistantError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] AssistantError),

    #[error("Docs file not found: {0}. Run scraper first.")]
    CorpusMissing(String),

    #[error("Failed to load documentation: {0}")]
    Corpus(#[source] AssistantError),

    #[error("Failed to build embedding index: {0}")]
    Embedding(#[source] AssistantError),
}

impl From<AssistantError> for InitializationError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Config(_) => InitializationError::Config(err),
            AssistantError::Embedding(_) => InitializationError::Embedding(err),
            other => InitializationError::Corpus(other),
        }
    }
}
