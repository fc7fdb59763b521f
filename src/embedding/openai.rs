use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::Embedder;
use crate::core::errors::AssistantError;

/// Embeddings from an OpenAI-compatible server (LM Studio, llama.cpp, vLLM).
#[derive(Clone)]
pub struct OpenAiEmbedder {
    base_url: String,
    model: String,
    dimension: usize,
    client: Client,
}

impl OpenAiEmbedder {
    pub fn new(base_url: String, model: String, dimension: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimension,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(AssistantError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AssistantError::Embedding(format!(
                "embedding request failed ({status}): {text}"
            )));
        }

        let payload: Value = res.json().await.map_err(AssistantError::embedding)?;
        parse_embeddings(&payload)
    }
}

fn parse_embeddings(payload: &Value) -> Result<Vec<Vec<f32>>, AssistantError> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| AssistantError::Embedding("response has no data array".to_string()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let values = item["embedding"].as_array().ok_or_else(|| {
            AssistantError::Embedding(format!("item {position} has no embedding"))
        })?;
        let vector = values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| {
                AssistantError::Embedding(format!("item {position} has a non-numeric component"))
            })?;
        let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(position);
        indexed.push((index, vector));
    }

    // Servers may return items out of order; `index` is authoritative.
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
