//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::TextGenerator;
use super::types::{GenerationOptions, GenerationResult};
use crate::core::errors::AssistantError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn request(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AssistantError> {
        let body = build_request_body(prompt, options);

        tracing::debug!(model = self.model.as_str(), "Sending Gemini request");

        let res = self
            .client
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::GenerationFailure(format!("request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AssistantError::GenerationFailure(format!("unreadable body: {e}")))?;

        if !status.is_success() {
            return Err(AssistantError::GenerationFailure(format!(
                "Gemini returned {status}: {}",
                error_message(&text)
            )));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| AssistantError::GenerationFailure(format!("invalid JSON: {e}")))?;
        parse_response(&payload)
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult {
        self.request(prompt, options).await.into()
    }
}

fn build_request_body(prompt: &str, options: &GenerationOptions) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": prompt}]
        }],
        "generationConfig": {
            "temperature": options.temperature,
            "maxOutputTokens": options.max_output_tokens,
        }
    })
}

fn parse_response(payload: &Value) -> Result<String, AssistantError> {
    if let Some(reason) = payload["promptFeedback"]["blockReason"].as_str() {
        return Err(AssistantError::GenerationFailure(format!(
            "prompt blocked: {reason}"
        )));
    }

    let parts = payload["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let finish = payload["candidates"][0]["finishReason"]
                .as_str()
                .unwrap_or("no candidates");
            AssistantError::GenerationFailure(format!("no content in response ({finish})"))
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    Ok(text)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_sampling_options() {
        let options = GenerationOptions {
            temperature: 0.3,
            max_output_tokens: 500,
        };
        let body = build_request_body("Question?", &options);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Question?");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 500);
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
    }

    #[test]
    fn parses_and_joins_text_parts() {
        let payload = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Use "}, {"text": "POST /tickets."}]},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_response(&payload).unwrap(), "Use POST /tickets.");
    }

    #[test]
    fn blocked_prompt_is_a_failure() {
        let payload = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = parse_response(&payload).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn missing_candidates_is_a_failure() {
        let err = parse_response(&json!({"candidates": []})).unwrap_err();
        assert!(matches!(err, AssistantError::GenerationFailure(_)));
    }

    #[test]
    fn api_error_message_is_extracted() {
        let body = r#"{"error": {"code": 404, "message": "models/gemini-pro is not found"}}"#;
        assert_eq!(error_message(body), "models/gemini-pro is not found");
        assert_eq!(error_message("plain text"), "plain text");
    }

    #[test]
    fn endpoint_uses_model_name() {
        let generator = GeminiGenerator::new(
            "key".to_string(),
            "gemini-1.5-flash".to_string(),
            Some("http://localhost:8080/".to_string()),
        );
        assert_eq!(
            generator.endpoint_url(),
            "http://localhost:8080/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_failure() {
        let generator = GeminiGenerator::new(
            "key".to_string(),
            "gemini-1.5-flash".to_string(),
            Some("http://127.0.0.1:9".to_string()),
        );
        let result = generator
            .generate("Hello", &GenerationOptions::default())
            .await;
        assert!(!result.is_success());
    }
}
