use std::sync::Arc;

use tokio::sync::RwLock;

use crate::assistant::DocsAssistant;
use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::core::errors::AssistantError;
use crate::corpus;
use crate::history::SessionStore;

pub mod error;

use error::InitializationError;

/// Application state shared by every route.
///
/// The assistant sits behind a lock only so `/api/reload` can swap in a
/// freshly built index; queries clone the `Arc` and never hold the lock.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: AppConfig,
    pub sessions: SessionStore,
    assistant: RwLock<Arc<DocsAssistant>>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// 1. Discover paths and load configuration
    /// 2. Load the corpus and the embedding model, build the index
    /// 3. Probe the generation capability
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let mut settings = config.load().map_err(InitializationError::Config)?;
        if settings.embedding.cache_dir.is_none() {
            let models_dir = paths.user_data_dir.join("models");
            settings.embedding.cache_dir = Some(models_dir.display().to_string());
        }

        let corpus_path = paths.resolve(&settings.corpus_path);
        if !corpus_path.exists() {
            return Err(InitializationError::CorpusMissing(
                corpus_path.display().to_string(),
            ));
        }

        tracing::info!("Loading documentation from {}", corpus_path.display());
        let assistant = DocsAssistant::initialize(&settings, &corpus_path).await?;

        Ok(Arc::new(Self::with_assistant(paths, config, settings, assistant)))
    }

    pub fn with_assistant(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: AppConfig,
        assistant: DocsAssistant,
    ) -> Self {
        Self {
            paths,
            config,
            sessions: SessionStore::with_capacity(settings.server.max_sessions),
            settings,
            assistant: RwLock::new(Arc::new(assistant)),
        }
    }

    pub async fn assistant(&self) -> Arc<DocsAssistant> {
        self.assistant.read().await.clone()
    }

    /// Re-reads the corpus and swaps in a fresh index.
    ///
    /// On failure the current index keeps serving.
    pub async fn reload(&self) -> Result<usize, AssistantError> {
        let corpus_path = self.paths.resolve(&self.settings.corpus_path);
        let chunks = corpus::load_file(&corpus_path)?;
        let current = self.assistant().await;
        let rebuilt = current.rebuild(chunks, &self.settings).await?;
        let count = rebuilt.chunk_count();

        *self.assistant.write().await = Arc::new(rebuilt);
        tracing::info!("Reloaded documentation: {} chunks", count);
        Ok(count)
    }
}
