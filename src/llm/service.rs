//! Generation capability lifecycle.
//!
//! ```text
//! Uninitialized --initialize--> Ready(generator)
//!                          \--> Unavailable(reason)
//! ```
//!
//! Candidates are probed once, in order, and the first one that answers a
//! probe prompt becomes the session's generator. The state never changes
//! after that; an unavailable service sends every query down the fallback path.

use std::sync::Arc;
use std::time::Duration;

use super::gemini::GeminiGenerator;
use super::openai::OpenAiGenerator;
use super::provider::TextGenerator;
use super::types::{GenerationOptions, GenerationResult};
use crate::core::config::{GenerationProviderKind, GenerationSettings};
use crate::core::errors::AssistantError;

pub const PROBE_PROMPT: &str = "Hello";

const DEFAULT_OPENAI_BASE_URL: &str = "http://localhost:1234";

#[derive(Clone)]
pub enum GenerationState {
    Uninitialized,
    Ready(Arc<dyn TextGenerator>),
    Unavailable(String),
}

impl std::fmt::Debug for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationState::Uninitialized => write!(f, "Uninitialized"),
            GenerationState::Ready(generator) => {
                write!(f, "Ready({}/{})", generator.name(), generator.model())
            }
            GenerationState::Unavailable(reason) => write!(f, "Unavailable({reason})"),
        }
    }
}

pub struct GenerationService {
    state: GenerationState,
    options: GenerationOptions,
    timeout: Duration,
}

impl GenerationService {
    pub fn new(options: GenerationOptions, timeout: Duration) -> Self {
        Self {
            state: GenerationState::Uninitialized,
            options,
            timeout,
        }
    }

    /// A service that is permanently in fallback mode.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: GenerationState::Unavailable(reason.into()),
            options: GenerationOptions::default(),
            timeout: Duration::from_secs(20),
        }
    }

    /// Builds and probes the candidates described by configuration.
    ///
    /// A missing Gemini credential short-circuits to `Unavailable` without
    /// any network traffic.
    pub async fn from_settings(settings: &GenerationSettings) -> Self {
        let options = GenerationOptions {
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        };
        let mut service = Self::new(options, settings.timeout());
        let api_key = settings.resolve_api_key();

        let candidates: Vec<Arc<dyn TextGenerator>> = match settings.provider {
            GenerationProviderKind::Gemini => {
                let Some(api_key) = api_key else {
                    let err = AssistantError::GenerationUnavailable(format!(
                        "no API key found in {}",
                        settings.api_key_env
                    ));
                    tracing::warn!("{}; answers will use retrieved excerpts only", err);
                    service.state = GenerationState::Unavailable(err.to_string());
                    return service;
                };
                settings
                    .models
                    .iter()
                    .map(|model| {
                        Arc::new(GeminiGenerator::new(
                            api_key.clone(),
                            model.clone(),
                            settings.base_url.clone(),
                        )) as Arc<dyn TextGenerator>
                    })
                    .collect()
            }
            GenerationProviderKind::OpenAi => {
                let base_url = settings
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
                settings
                    .models
                    .iter()
                    .map(|model| {
                        Arc::new(OpenAiGenerator::new(
                            base_url.clone(),
                            model.clone(),
                            api_key.clone(),
                        )) as Arc<dyn TextGenerator>
                    })
                    .collect()
            }
        };

        service.initialize(candidates).await;
        service
    }

    /// Probes `candidates` in order; the first success wins.
    ///
    /// Only the first call has any effect.
    pub async fn initialize(&mut self, candidates: Vec<Arc<dyn TextGenerator>>) {
        if !matches!(self.state, GenerationState::Uninitialized) {
            tracing::debug!("Generation already initialized: {:?}", self.state);
            return;
        }

        for candidate in candidates {
            match self.call(candidate.as_ref(), PROBE_PROMPT).await {
                GenerationResult::Success(_) => {
                    tracing::info!(
                        "Generation model '{}' ({}) ready",
                        candidate.model(),
                        candidate.name()
                    );
                    self.state = GenerationState::Ready(candidate);
                    return;
                }
                GenerationResult::Failure(reason) => {
                    tracing::warn!("Model '{}' failed probe: {}", candidate.model(), reason);
                }
            }
        }

        let err = AssistantError::GenerationUnavailable("no candidate model answered".to_string());
        tracing::warn!("{}; answers will use retrieved excerpts only", err);
        self.state = GenerationState::Unavailable(err.to_string());
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GenerationState::Ready(_))
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Short status for health reporting, e.g. `ready:gemini-1.5-flash`.
    pub fn status_label(&self) -> String {
        match &self.state {
            GenerationState::Uninitialized => "uninitialized".to_string(),
            GenerationState::Ready(generator) => format!("ready:{}", generator.model()),
            GenerationState::Unavailable(_) => "unavailable".to_string(),
        }
    }

    /// Runs one generation with the session's options and timeout.
    pub async fn generate(&self, prompt: &str) -> GenerationResult {
        match &self.state {
            GenerationState::Ready(generator) => self.call(generator.as_ref(), prompt).await,
            GenerationState::Uninitialized => {
                GenerationResult::Failure("generation not initialized".to_string())
            }
            GenerationState::Unavailable(reason) => GenerationResult::Failure(reason.clone()),
        }
    }

    async fn call(&self, generator: &dyn TextGenerator, prompt: &str) -> GenerationResult {
        match tokio::time::timeout(self.timeout, generator.generate(prompt, &self.options)).await {
            Ok(result) => result,
            Err(_) => GenerationResult::Failure(
                AssistantError::GenerationFailure(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ))
                .to_string(),
            ),
        }
    }
}
