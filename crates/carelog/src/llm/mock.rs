//! Mock LLM provider for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{CarelogError, Result};

use super::provider::{LlmConfig, LlmProvider, Prompt, PromptKind};

type Responder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Mock LLM provider that returns predictable responses for testing.
///
/// Every answer is derived from the prompt's `input`, in the format the real
/// templates ask for. Any kind can be overridden with a closure, and calls of
/// a kind can be made to fail, immediately or after a number of successes.
pub struct MockProvider {
    config: LlmConfig,
    responders: HashMap<PromptKind, Responder>,
    failures: HashMap<PromptKind, usize>,
    calls: Mutex<Vec<Prompt>>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::with_config(LlmConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Self {
        Self {
            config,
            responders: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer prompts of `kind` with `respond(input)`.
    pub fn with_response(
        mut self,
        kind: PromptKind,
        respond: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.responders.insert(kind, Arc::new(respond));
        self
    }

    /// Fail every prompt of `kind`.
    pub fn fail_on(self, kind: PromptKind) -> Self {
        self.fail_after(kind, 0)
    }

    /// Answer the first `successes` prompts of `kind`, then fail.
    pub fn fail_after(mut self, kind: PromptKind, successes: usize) -> Self {
        self.failures.insert(kind, successes);
        self
    }

    /// Every prompt received so far, in arrival order.
    pub fn calls(&self) -> Vec<Prompt> {
        self.log().clone()
    }

    /// Number of prompts of `kind` received so far (failed ones included).
    pub fn call_count(&self, kind: PromptKind) -> usize {
        self.log().iter().filter(|p| p.kind == kind).count()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<Prompt>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn canned(kind: PromptKind, input: &str) -> String {
        match kind {
            PromptKind::Speech => match first_quote(input) {
                Some(quote) => format!("output: {}", quote),
                None => String::new(),
            },
            PromptKind::Personality => match first_quote(input) {
                Some(quote) => format!("output: (発言){}と話している", quote),
                None => "output: 該当なし".to_string(),
            },
            PromptKind::IcfAbstraction | PromptKind::CareplanAbstraction => {
                let input = input.trim();
                if input.is_empty() {
                    "abstraction: 該当なし".to_string()
                } else {
                    let summary: String = input.chars().take(20).collect();
                    format!("abstraction: ({}) {}", category_for(input), summary)
                }
            }
            PromptKind::Emotion => {
                let label = if ["笑", "ありがとう", "楽し", "喜"].iter().any(|w| input.contains(w)) {
                    "positive"
                } else if ["痛", "拒否", "怒", "不穏"].iter().any(|w| input.contains(w)) {
                    "negative"
                } else {
                    "neutral"
                };
                format!("emotion:{}：1.0, summative:{}", label, label)
            }
            PromptKind::IcfLabeling => code_for(input).to_string(),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let seen = {
            let mut log = self.log();
            let seen = log.iter().filter(|p| p.kind == prompt.kind).count();
            log.push(prompt.clone());
            seen
        };

        if let Some(&successes) = self.failures.get(&prompt.kind) {
            if seen >= successes {
                return Err(CarelogError::llm(
                    "mock",
                    format!("injected failure for {} prompt", prompt.kind),
                ));
            }
        }

        Ok(match self.responders.get(&prompt.kind) {
            Some(respond) => respond(&prompt.input),
            None => Self::canned(prompt.kind, &prompt.input),
        })
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// First `「…」` quotation in `text`, brackets included.
fn first_quote(text: &str) -> Option<&str> {
    let start = text.find('「')?;
    let end = text[start..].find('」')? + start + '」'.len_utf8();
    Some(&text[start..end])
}

const KEYWORD_CODES: &[(&str, &str, &str)] = &[
    ("歩行", "歩行", "d450"),
    ("歩", "歩行", "d450"),
    ("食事", "食事", "d550"),
    ("入浴", "入浴", "d510"),
    ("風呂", "入浴", "d510"),
    ("排泄", "排泄", "d530"),
    ("トイレ", "排泄", "d530"),
    ("会話", "対人関係", "d710"),
    ("睡眠", "心身機能", "b134"),
    ("眠", "心身機能", "b134"),
];

fn category_for(text: &str) -> &'static str {
    KEYWORD_CODES
        .iter()
        .find(|(keyword, _, _)| text.contains(keyword))
        .map(|(_, category, _)| *category)
        .unwrap_or("活動")
}

fn code_for(text: &str) -> &'static str {
    KEYWORD_CODES
        .iter()
        .find(|(keyword, _, _)| text.contains(keyword))
        .map(|(_, _, code)| *code)
        .unwrap_or("d570")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts;

    #[tokio::test]
    async fn test_canned_answers_follow_formats() {
        let provider = MockProvider::new();

        let speech = provider
            .complete(&prompts::speech_prompt("「ありがとう」と笑顔"))
            .await
            .unwrap();
        assert_eq!(speech, "output: 「ありがとう」");

        let abstraction = provider
            .complete(&prompts::icf_abstraction_prompt("歩行器で移動"))
            .await
            .unwrap();
        assert_eq!(abstraction, "abstraction: (歩行) 歩行器で移動");

        let emotion = provider
            .complete(&prompts::emotion_prompt("「ありがとう」と笑顔"))
            .await
            .unwrap();
        assert!(emotion.ends_with("summative:positive"));

        let code = provider
            .complete(&prompts::icf_labeling_prompt("", "(入浴) 入浴を楽しむ"))
            .await
            .unwrap();
        assert_eq!(code, "d510");
    }

    #[tokio::test]
    async fn test_override_and_call_log() {
        let provider =
            MockProvider::new().with_response(PromptKind::Emotion, |_| "summative:negative".into());

        let answer = provider
            .complete(&prompts::emotion_prompt("穏やか"))
            .await
            .unwrap();
        assert_eq!(answer, "summative:negative");
        assert_eq!(provider.call_count(PromptKind::Emotion), 1);
        assert_eq!(provider.calls()[0].input, "穏やか");
    }

    #[tokio::test]
    async fn test_fail_after() {
        let provider = MockProvider::new().fail_after(PromptKind::IcfLabeling, 1);

        let first = prompts::icf_labeling_prompt("", "a");
        assert!(provider.complete(&first).await.is_ok());
        let err = provider.complete(&first).await.unwrap_err();
        assert!(matches!(err, CarelogError::Llm { .. }));

        // Other kinds are unaffected.
        assert!(provider.complete(&prompts::speech_prompt("x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let provider = MockProvider::with_config(LlmConfig {
            batch_concurrency: 2,
            ..Default::default()
        });
        let batch: Vec<Prompt> = ["入浴", "食事", "歩行"]
            .iter()
            .map(|s| prompts::icf_labeling_prompt("", s))
            .collect();

        let answers = provider.complete_batch(&batch).await.unwrap();
        assert_eq!(answers, vec!["d510", "d550", "d450"]);
    }

    #[tokio::test]
    async fn test_batch_fails_as_a_whole() {
        let provider = MockProvider::new().fail_on(PromptKind::Speech);
        let batch = vec![prompts::speech_prompt("a"), prompts::speech_prompt("b")];
        assert!(provider.complete_batch(&batch).await.is_err());
    }
}
