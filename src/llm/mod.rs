pub mod gemini;
pub mod openai;
pub mod provider;
pub mod service;
pub mod types;

pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;
pub use provider::TextGenerator;
pub use service::{GenerationService, GenerationState};
pub use types::{GenerationOptions, GenerationResult};
