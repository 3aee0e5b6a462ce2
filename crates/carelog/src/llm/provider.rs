//! LLM provider trait and types.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which template a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Resident speech extraction.
    Speech,
    /// Personal-trait abstraction (`output: (tag) text`).
    Personality,
    /// ICF abstraction of a care-log entry (`abstraction:` lines).
    IcfAbstraction,
    /// ICF abstraction of a single care-plan clause.
    CareplanAbstraction,
    /// Emotion distribution with a summative label.
    Emotion,
    /// ICF code labeling with retrieved context.
    IcfLabeling,
}

impl PromptKind {
    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Speech => "speech",
            PromptKind::Personality => "personality",
            PromptKind::IcfAbstraction => "icf_abstraction",
            PromptKind::CareplanAbstraction => "careplan_abstraction",
            PromptKind::Emotion => "emotion",
            PromptKind::IcfLabeling => "icf_labeling",
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered prompt ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Template the prompt was rendered from.
    pub kind: PromptKind,
    /// The input the template was filled with (clause, entry, abstraction).
    pub input: String,
    /// Full prompt text.
    pub text: String,
}

/// Configuration for LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "gpt-5-mini").
    pub model: String,

    /// Upper bound on completion tokens (None = provider default).
    pub max_tokens: Option<usize>,

    /// Sampling temperature (None = provider default).
    pub temperature: Option<f64>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Requests in flight at once during a batch call.
    pub batch_concurrency: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            timeout_secs: 120,
            batch_concurrency: 16,
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations must be thread-safe (Send + Sync) so one provider can be
/// shared by the HTTP handlers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the raw response text.
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    /// Send many independent prompts and return one response per prompt,
    /// in input order.
    ///
    /// The whole batch fails on the first error. At most
    /// `config().batch_concurrency` requests are in flight.
    async fn complete_batch(&self, prompts: &[Prompt]) -> Result<Vec<String>> {
        let limit = self.config().batch_concurrency.max(1);
        let pending: Vec<_> = prompts.iter().map(|prompt| self.complete(prompt)).collect();
        stream::iter(pending).buffered(limit).try_collect().await
    }

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}
