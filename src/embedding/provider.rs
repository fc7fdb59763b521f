use async_trait::async_trait;

use crate::core::errors::AssistantError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// return the embedder name (e.g. "fastembed", "openai")
    fn name(&self) -> &str;

    /// length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// embed all inputs in one batch call; output order matches input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AssistantError>;
}
