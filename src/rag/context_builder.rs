//! Context and prompt assembly for answer generation.

use super::retriever::ScoredChunk;

pub const FALLBACK_PREFIX: &str = "Based on the documentation:\n\n";

/// Characters of context quoted by the fallback answer.
pub const FALLBACK_CONTEXT_CHARS: usize = 500;

/// Concatenates chunk contents in ranked order, each followed by a blank line.
pub fn build_context(results: &[ScoredChunk]) -> String {
    let mut context = String::new();
    for result in results {
        context.push_str(&result.chunk.content);
        context.push_str("\n\n");
    }
    context
}

pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "You are a professional assistant. Answer clearly, accurately, and in simple English.\n\
         Provide a helpful answer with any relevant code examples or commands if needed. \
         Be specific and practical.\n\
         Documentation:\n\
         {context}\n\
         Question: {query}\n"
    )
}

/// Degraded-mode answer quoting the start of the retrieved context.
pub fn fallback_answer(context: &str) -> String {
    let excerpt: String = context.chars().take(FALLBACK_CONTEXT_CHARS).collect();
    format!("{FALLBACK_PREFIX}{excerpt}...")
}
