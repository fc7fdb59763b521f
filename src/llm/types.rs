use serde::{Deserialize, Serialize};

use crate::core::errors::AssistantError;

/// Sampling options passed with every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 500,
        }
    }
}

/// Outcome of one call to a text generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success(String),
    Failure(String),
}

impl GenerationResult {
    /// Wraps generated text; blank text counts as a failure.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            GenerationResult::Failure("empty response".to_string())
        } else {
            GenerationResult::Success(trimmed.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }
}

impl From<Result<String, AssistantError>> for GenerationResult {
    fn from(result: Result<String, AssistantError>) -> Self {
        match result {
            Ok(text) => GenerationResult::from_text(text),
            Err(err) => GenerationResult::Failure(err.to_string()),
        }
    }
}
