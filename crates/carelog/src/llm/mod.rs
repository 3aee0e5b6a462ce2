//! LLM provider integration.
//!
//! Every annotation in carelog comes from a prompt call: abstraction,
//! speech and trait extraction, emotion scoring and ICF labeling. This module
//! holds the provider abstraction, the prompt templates, and two providers:
//!
//! - **OpenAI** - chat-completions API (requires `OPENAI_API_KEY`)
//! - **Mock** - deterministic offline answers for tests and dry runs
//!
//! # Example
//!
//! ```no_run
//! use carelog::llm::{LlmProvider, MockProvider, prompts};
//!
//! # async fn demo() -> carelog::Result<()> {
//! let provider = MockProvider::new();
//! let answer = provider.complete(&prompts::emotion_prompt("笑顔で会話")).await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

mod mock;
mod openai;
pub mod prompts;
mod provider;

pub use mock::MockProvider;
pub use openai::OpenAIProvider;
pub use provider::{LlmConfig, LlmProvider, Prompt, PromptKind};
