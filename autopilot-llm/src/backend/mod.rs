//! Text-generation backend abstraction layer.
//!
//! - OpenAI-compatible chat completions (OpenAI, vLLM, Ollama, ...)
//! - Mock backend for testing

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::MockGenerator;
pub use openai::OpenAiGenerator;
pub use traits::{GenerationRequest, LlmError, TextGenerator};
