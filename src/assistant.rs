//! The documentation assistant: a loaded corpus, its embedding index and the
//! composer that answers queries against it.

use std::path::Path;
use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::errors::AssistantError;
use crate::corpus::{self, Chunk};
use crate::embedding::{self, Embedder};
use crate::llm::GenerationService;
use crate::rag::{search, AnswerComposer, AnswerResult, EmbeddingIndex, ScoredChunk};

pub struct DocsAssistant {
    index: EmbeddingIndex,
    composer: AnswerComposer,
}

impl DocsAssistant {
    /// Loads the corpus and the configured embedding model, builds the index
    /// and probes generation once.
    ///
    /// Corpus and embedding failures abort startup; generation problems only
    /// put the assistant into fallback mode.
    pub async fn initialize(config: &AppConfig, corpus_path: &Path) -> Result<Self, AssistantError> {
        let chunks = corpus::load_file(corpus_path)?;
        let settings = config.embedding.clone();
        let embedder = tokio::task::spawn_blocking(move || embedding::from_settings(&settings))
            .await
            .map_err(AssistantError::embedding)??;

        Self::initialize_with(config, chunks, embedder).await
    }

    /// Same as `initialize`, over already loaded chunks and a given embedder.
    pub async fn initialize_with(
        config: &AppConfig,
        chunks: Vec<Chunk>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AssistantError> {
        let index = EmbeddingIndex::build(chunks, embedder).await?;
        let generation = Arc::new(GenerationService::from_settings(&config.generation).await);

        Ok(Self::from_parts(index, generation, config))
    }

    pub fn from_parts(
        index: EmbeddingIndex,
        generation: Arc<GenerationService>,
        config: &AppConfig,
    ) -> Self {
        let composer = AnswerComposer::new(generation).with_retrieval(&config.retrieval);
        Self { index, composer }
    }

    /// Builds a fresh index over `chunks`, keeping this session's generation
    /// state. The current assistant is left untouched.
    pub async fn rebuild(
        &self,
        chunks: Vec<Chunk>,
        config: &AppConfig,
    ) -> Result<Self, AssistantError> {
        let embedder: Arc<dyn Embedder> = self.index.embedder().clone();
        let index = EmbeddingIndex::build(chunks, embedder).await?;
        Ok(Self::from_parts(
            index,
            self.composer.generation().clone(),
            config,
        ))
    }

    pub async fn answer(&self, query: &str) -> Result<AnswerResult, AssistantError> {
        self.composer.answer(&self.index, query).await
    }

    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>, AssistantError> {
        search(&self.index, query, top_k).await
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn generation(&self) -> &GenerationService {
        self.composer.generation()
    }
}
