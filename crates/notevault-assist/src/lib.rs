//! # notevault-assist
//!
//! Text-assist collaborator: an opaque generative-text capability behind the
//! [`GenerationBackend`] trait, plus the two orchestration flows built on it
//! (summarization and grammar correction).
//!
//! A backend failure is never fatal to the rest of the system; callers map it
//! to a service-unavailable response for the assist endpoints only.

pub mod config;
pub mod gemini;
pub mod grammar;
pub mod mock;
pub mod summarize;

use async_trait::async_trait;

use notevault_core::Result;

pub use config::AssistConfig;
pub use gemini::GeminiBackend;
pub use grammar::{check_grammar, GrammarOutcome};
pub use mock::MockBackend;
pub use summarize::{summarize, SummarizeOutcome};

/// An opaque prompt-in, text-out generation capability.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
