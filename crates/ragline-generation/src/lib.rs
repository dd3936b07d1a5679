pub mod error;
pub mod llm;
pub mod prompt;
pub mod service;

pub use error::GenerationError;
pub use llm::{DynLlmClient, HttpLlmClient, LlmClient, MockLlm};
pub use prompt::{build_prompt, format_context};
pub use service::GenerationService;
