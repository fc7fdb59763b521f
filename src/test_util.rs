//! Deterministic capability doubles for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::core::errors::AssistantError;
use crate::embedding::Embedder;
use crate::llm::{GenerationOptions, GenerationResult, TextGenerator};
use crate::vector_math::normalize;

pub fn as_generator(generator: &Arc<ScriptedGenerator>) -> Arc<dyn TextGenerator> {
    generator.clone()
}

/// Generator that replays scripted replies and records prompts.
///
/// Replies are consumed one per call; the last one repeats forever.
pub struct ScriptedGenerator {
    model: String,
    replies: Vec<Result<String, String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(model: &str, reply: &str) -> Self {
        Self::scripted(model, vec![Ok(reply.to_string())])
    }

    pub fn failing(model: &str, reason: &str) -> Self {
        Self::scripted(model, vec![Err(reason.to_string())])
    }

    pub fn scripted(model: &str, replies: Vec<Result<String, String>>) -> Self {
        Self {
            model: model.to_string(),
            replies,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers the startup probe, then replies with `later` on every call.
    pub fn probe_then(model: &str, later: Result<&str, &str>) -> Self {
        let later = later.map(str::to_string).map_err(str::to_string);
        Self::scripted(model, vec![Ok("probe ok".to_string()), later])
    }

    /// Sleeps before replying. With several replies scripted, the first call
    /// (the startup probe) is answered immediately.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> GenerationResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            if call > 0 || self.replies.len() == 1 {
                tokio::time::sleep(delay).await;
            }
        }
        let reply = self
            .replies
            .get(call)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_else(|| Err("no scripted reply".to_string()));
        match reply {
            Ok(text) => GenerationResult::from_text(text),
            Err(reason) => GenerationResult::Failure(reason),
        }
    }
}

/// Embedder returning hand-picked vectors keyed by exact text.
pub struct ScriptedEmbedder {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    fail: bool,
    short_by: usize,
    batches: AtomicUsize,
}

impl ScriptedEmbedder {
    pub fn new(dimension: usize) -> Self {
        let mut fallback = vec![0.0; dimension];
        if let Some(last) = fallback.last_mut() {
            *last = 1.0;
        }
        Self {
            dimension,
            vectors: HashMap::new(),
            fallback,
            fail: false,
            short_by: 0,
            batches: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Drops `count` vectors from every batch result.
    pub fn truncating(mut self, count: usize) -> Self {
        self.short_by = count;
        self
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    fn name(&self) -> &str {
        "scripted"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AssistantError::Embedding("model crashed".to_string()));
        }
        let mut vectors: Vec<Vec<f32>> = inputs
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.clone())
            })
            .collect();
        vectors.truncate(vectors.len().saturating_sub(self.short_by));
        Ok(vectors)
    }
}

/// Offline stand-in for a sentence model: lower-cased words and word pairs
/// hashed into signed buckets. Texts that share words score higher; nothing
/// else about meaning is captured.
#[derive(Debug, Clone)]
pub struct KeywordEmbedder {
    dimension: usize,
}

impl KeywordEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect();

        for word in &words {
            self.accumulate(&mut vector, word, 1.0);
        }
        for pair in words.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        normalize(&mut vector);
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
        Ok(inputs.iter().map(|text| self.embed_one(text)).collect())
    }
}
