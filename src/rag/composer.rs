//! Answer composition: retrieval, generation with deterministic fallback,
//! and packaging of sources and confidence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::context_builder::{build_context, build_prompt, fallback_answer};
use super::index::EmbeddingIndex;
use super::retriever::{search, ScoredChunk, DEFAULT_TOP_K};
use crate::core::config::RetrievalSettings;
use crate::core::errors::AssistantError;
use crate::llm::{GenerationResult, GenerationService};

pub const NO_INFORMATION_MESSAGE: &str = "No relevant information found in documentation.";

pub const GREETING_MESSAGE: &str = "Hello! I can help answer questions specifically about the \
     API documentation. Please ask a more specific question, like 'How do I create a ticket \
     using curl?'";

const GREETING_WORDS: [&str; 4] = ["help", "hello", "hi", "support"];
const GREETING_PHRASES: [&str; 2] = ["how are you", "can you help me"];
const GREETING_MAX_TOKENS: usize = 5;

const DEFAULT_PREVIEW_CHARS: usize = 150;
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// One retrieved passage as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub section: String,
    pub content_preview: String,
    /// Similarity rounded to two decimals.
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Source>,
    /// Present only when the top match is trustworthy.
    pub confidence: Option<f32>,
}

impl AnswerResult {
    fn no_information(query: &str) -> Self {
        Self {
            query: query.to_string(),
            answer: NO_INFORMATION_MESSAGE.to_string(),
            sources: Vec::new(),
            confidence: None,
        }
    }
}

pub struct AnswerComposer {
    generation: Arc<GenerationService>,
    top_k: usize,
    preview_chars: usize,
    confidence_threshold: f32,
}

impl AnswerComposer {
    pub fn new(generation: Arc<GenerationService>) -> Self {
        Self {
            generation,
            top_k: DEFAULT_TOP_K,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_retrieval(mut self, settings: &RetrievalSettings) -> Self {
        self.top_k = settings.top_k;
        self.preview_chars = settings.preview_chars;
        self.confidence_threshold = settings.confidence_threshold;
        self
    }

    pub fn generation(&self) -> &Arc<GenerationService> {
        &self.generation
    }

    /// Answers `query` from `index`.
    ///
    /// Generation problems never surface here: they degrade to the fallback
    /// answer. Only a failure to embed the query is returned as an error.
    pub async fn answer(
        &self,
        index: &EmbeddingIndex,
        query: &str,
    ) -> Result<AnswerResult, AssistantError> {
        let docs = search(index, query, self.top_k).await?;
        if docs.is_empty() {
            return Ok(AnswerResult::no_information(query));
        }

        let context = build_context(&docs);
        let answer = self.generate_answer(query, &context).await;

        Ok(AnswerResult {
            query: query.to_string(),
            answer,
            sources: self.sources(&docs),
            confidence: self.headline_confidence(&docs),
        })
    }

    async fn generate_answer(&self, query: &str, context: &str) -> String {
        if is_general_query(query) {
            return GREETING_MESSAGE.to_string();
        }

        if !self.generation.is_ready() {
            return fallback_answer(context);
        }

        match self.generation.generate(&build_prompt(context, query)).await {
            GenerationResult::Success(text) => text,
            GenerationResult::Failure(reason) => {
                tracing::warn!("Generation failed, using fallback: {}", reason);
                fallback_answer(context)
            }
        }
    }

    fn sources(&self, docs: &[ScoredChunk]) -> Vec<Source> {
        docs.iter()
            .map(|doc| Source {
                section: doc.chunk.section.clone(),
                content_preview: doc.chunk.preview(self.preview_chars),
                confidence: round_confidence(doc.score),
            })
            .collect()
    }

    fn headline_confidence(&self, docs: &[ScoredChunk]) -> Option<f32> {
        docs.first()
            .filter(|top| top.score > self.confidence_threshold)
            .map(|top| round_confidence(top.score))
    }
}

/// Short conversational queries ("hi", "can you help me") that are not
/// documentation questions.
pub fn is_general_query(query: &str) -> bool {
    if query.split_whitespace().count() > GREETING_MAX_TOKENS {
        return false;
    }

    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if words.iter().any(|w| GREETING_WORDS.contains(w)) {
        return true;
    }

    let padded = format!(" {} ", words.join(" "));
    GREETING_PHRASES
        .iter()
        .any(|phrase| padded.contains(&format!(" {phrase} ")))
}

pub fn round_confidence(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}
