use async_trait::async_trait;

use super::types::{GenerationOptions, GenerationResult};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// return the provider name (e.g. "gemini", "openai")
    fn name(&self) -> &str;

    /// model this generator sends requests to
    fn model(&self) -> &str;

    /// single-prompt completion; never panics, failures come back as `Failure`
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult;
}
