//! Local sentence-transformer embeddings (ONNX runtime via fastembed).
//!
//! The model is downloaded into the cache directory on first use and loaded
//! once per process. Inference is CPU-bound, so batches run on the blocking
//! thread pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::provider::Embedder;
use crate::core::errors::AssistantError;

pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

pub struct SentenceEmbedder {
    model_name: String,
    dimension: usize,
    model: Arc<Mutex<TextEmbedding>>,
}

impl SentenceEmbedder {
    /// Loads `model_name`, fetching it into `cache_dir` if it is not there.
    ///
    /// Blocks; async callers should go through `spawn_blocking`.
    pub fn load(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self, AssistantError> {
        let model_kind = resolve_model(model_name)?;
        let mut options = InitOptions::new(model_kind).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        tracing::info!("Loading embedding model '{}'", model_name);
        let mut model = TextEmbedding::try_new(options).map_err(|e| {
            AssistantError::Embedding(format!("failed to load '{model_name}': {e}"))
        })?;

        // Width comes from the model itself rather than from configuration.
        let dimension = model
            .embed(vec!["dimension check"], None)
            .map_err(AssistantError::embedding)?
            .first()
            .map(Vec::len)
            .filter(|len| *len > 0)
            .ok_or_else(|| {
                AssistantError::Embedding(format!("model '{model_name}' returned no vector"))
            })?;
        tracing::info!("Embedding model '{}' ready ({} dims)", model_name, dimension);

        Ok(Self {
            model_name: model_name.to_string(),
            dimension,
            model: Arc::new(Mutex::new(model)),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Maps configured names (with or without the hub prefix) onto fastembed models.
fn resolve_model(name: &str) -> Result<EmbeddingModel, AssistantError> {
    let normalized = name.trim().to_lowercase();
    let short = normalized
        .trim_start_matches("sentence-transformers/")
        .trim_start_matches("baai/");

    match short {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        _ => Err(AssistantError::Config(format!(
            "embedding.model '{name}' is not a supported local model"
        ))),
    }
}

#[async_trait]
impl Embedder for SentenceEmbedder {
    fn name(&self) -> &str {
        "fastembed"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model.clone();
        let texts = inputs.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| AssistantError::Embedding("embedding model lock poisoned".to_string()))?;
            model.embed(texts, None).map_err(AssistantError::embedding)
        })
        .await
        .map_err(AssistantError::embedding)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_math::rank_descending_by_cosine;

    #[test]
    fn resolves_configured_model_names() {
        assert!(matches!(
            resolve_model(DEFAULT_MODEL),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            resolve_model("sentence-transformers/all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            resolve_model("BAAI/bge-small-en-v1.5"),
            Ok(EmbeddingModel::BGESmallENV15)
        ));
    }

    #[test]
    fn unknown_model_is_a_config_error() {
        let err = resolve_model("word2vec").unwrap_err();
        assert!(matches!(err, AssistantError::Config(msg) if msg.contains("word2vec")));
    }

    #[test]
    fn unknown_model_fails_before_any_download() {
        let dir = tempfile::tempdir().unwrap();
        let err = SentenceEmbedder::load("word2vec", Some(dir.path().to_path_buf()))
            .err()
            .unwrap();
        assert!(matches!(err, AssistantError::Config(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    #[ignore = "downloads the all-MiniLM-L6-v2 model"]
    async fn ranks_by_meaning_not_shared_words() {
        let embedder = SentenceEmbedder::load(DEFAULT_MODEL, None).unwrap();
        assert_eq!(embedder.dimension(), 384);

        let passages = vec![
            "Use POST /tickets to create a ticket.".to_string(),
            "Authenticate with your API key.".to_string(),
            "Delete an asset with DELETE /assets/{id}.".to_string(),
        ];
        let vectors = embedder.embed(&passages).await.unwrap();

        for (query, expected) in [
            ("What credentials does the service require?", 1),
            ("remove hardware item", 2),
        ] {
            let query_vector = embedder.embed(&[query.to_string()]).await.unwrap();
            let ranked = rank_descending_by_cosine(&query_vector[0], &vectors).unwrap();
            assert_eq!(ranked[0].0, expected, "{query}: {ranked:?}");
            assert!(ranked[0].1 > 0.0);
        }
    }
}
