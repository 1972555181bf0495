//! Text-generation boundary (OpenAI/Anthropic/Groq).
//!
//! Every call is a single attempt under a fixed timeout. Replies are
//! untrusted free text; callers extract and validate structure themselves.

pub mod config;
pub mod generator;
pub mod providers;
pub mod types;

pub use config::LLMConfig;
pub use generator::{
    generate_with_timeout, LlmGenerator, NoopGenerator, StaticGenerator, TextGenerator,
};
pub use types::*;
