use super::settings::AppConfig;
use crate::core::errors::AssistantError;

pub fn validate_config(config: &AppConfig) -> Result<(), AssistantError> {
    if config.corpus_path.trim().is_empty() {
        return Err(invalid("corpus_path", "must not be empty"));
    }
    if config.retrieval.top_k == 0 {
        return Err(invalid("retrieval.top_k", "must be >= 1"));
    }
    if !(0.0..=1.0).contains(&config.retrieval.confidence_threshold) {
        return Err(invalid(
            "retrieval.confidence_threshold",
            "must be between 0.0 and 1.0",
        ));
    }
    if config.embedding.dimension == 0 {
        return Err(invalid("embedding.dimension", "must be >= 1"));
    }
    if config.embedding.model.trim().is_empty() {
        return Err(invalid("embedding.model", "must not be empty"));
    }
    if config.server.max_sessions == 0 {
        return Err(invalid("server.max_sessions", "must be >= 1"));
    }

    let generation = &config.generation;
    if !(0.0..=2.0).contains(&generation.temperature) {
        return Err(invalid(
            "generation.temperature",
            "must be between 0.0 and 2.0",
        ));
    }
    if generation.max_output_tokens == 0 {
        return Err(invalid("generation.max_output_tokens", "must be >= 1"));
    }
    if generation.timeout_secs == 0 {
        return Err(invalid("generation.timeout_secs", "must be >= 1"));
    }
    if generation.models.iter().any(|m| m.trim().is_empty()) {
        return Err(invalid("generation.models", "entries must not be empty"));
    }

    Ok(())
}

fn invalid(field: &str, reason: &str) -> AssistantError {
    AssistantError::Config(format!("{field} {reason}"))
}
