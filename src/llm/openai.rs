use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::TextGenerator;
use super::types::{GenerationOptions, GenerationResult};
use crate::core::errors::AssistantError;

/// Chat completions against an OpenAI-compatible server.
#[derive(Clone)]
pub struct OpenAiGenerator {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiGenerator {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client: Client::new(),
        }
    }

    async fn request(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
            "temperature": options.temperature,
            "max_tokens": options.max_output_tokens,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req
            .send()
            .await
            .map_err(|e| AssistantError::GenerationFailure(e.to_string()))?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AssistantError::GenerationFailure(format!(
                "chat completion error: {text}"
            )));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| AssistantError::GenerationFailure(e.to_string()))?;

        Ok(payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult {
        self.request(prompt, options).await.into()
    }
}
