//! Typed view over the merged YAML configuration.
//!
//! Every field has a default so an empty `config.yml` (or none at all) yields
//! a working setup: local `all-MiniLM-L6-v2` embeddings (downloaded once) and
//! Gemini generation that degrades to fallback mode when no API key is present.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CORPUS_PATH: &str = "output/freshservice_docs.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub corpus_path: String,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: DEFAULT_CORPUS_PATH.to_string(),
            retrieval: RetrievalSettings::default(),
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Chunks retrieved per query.
    pub top_k: usize,
    /// Characters of chunk content shown per source.
    pub preview_chars: usize,
    /// Top similarity must exceed this for a headline confidence.
    pub confidence_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            preview_chars: 150,
            confidence_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local ONNX sentence-transformer via fastembed.
    FastEmbed,
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProviderKind,
    /// Only used by `openai`; local models report their own width.
    pub dimension: usize,
    pub model: String,
    pub base_url: String,
    /// Where local models are downloaded. Defaults to `<data_dir>/models`.
    pub cache_dir: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::FastEmbed,
            dimension: 384,
            model: "all-MiniLM-L6-v2".to_string(),
            base_url: "http://localhost:1234".to_string(),
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProviderKind {
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: GenerationProviderKind,
    /// Candidate models, probed in order at startup.
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_key_env: String,
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit `api_key` wins over the environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProviderKind::Gemini,
            models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro".to_string(),
                "gemini-pro".to_string(),
            ],
            temperature: 0.3,
            max_output_tokens: 500,
            timeout_secs: 20,
            base_url: None,
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    /// 0 binds an ephemeral port.
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_sessions: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: Vec::new(),
            max_sessions: 1000,
        }
    }
}
