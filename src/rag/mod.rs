//! Retrieval-augmented answering.
//!
//! - `EmbeddingIndex`: chunk embeddings, built once per corpus
//! - `search`: top-k cosine retrieval over the index
//! - `AnswerComposer`: context assembly, generation with fallback, sources

mod composer;
mod context_builder;
mod index;
mod retriever;

pub use composer::{
    is_general_query, round_confidence, AnswerComposer, AnswerResult, Source, GREETING_MESSAGE,
    NO_INFORMATION_MESSAGE,
};
pub use context_builder::{build_context, fallback_answer, FALLBACK_PREFIX};
pub use index::EmbeddingIndex;
pub use retriever::{search, ScoredChunk, DEFAULT_TOP_K};
