//! Two-step ICF tagging of care-plan text.
//!
//! A care plan arrives as comma-separated clauses. Each clause is abstracted
//! by one prompt call, and the abstraction is labeled with ICF codes by a
//! second call grounded on retrieved reference snippets.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::evaluate::parse::{parse_careplan_abstraction, split_code_list};
use crate::llm::{LlmProvider, prompts};
use crate::retrieval::{Retriever, format_context};

/// One tagged clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedPlan {
    /// The clause as submitted.
    pub source: String,
    /// Its abstraction.
    pub plan: String,
    /// Codes assigned to the abstraction.
    pub icf_codes: Vec<String>,
}

/// Abstracts and labels care-plan clauses.
#[derive(Clone)]
pub struct Tagger {
    llm: Arc<dyn LlmProvider>,
    retriever: Arc<dyn Retriever>,
}

impl Tagger {
    pub fn new(llm: Arc<dyn LlmProvider>, retriever: Arc<dyn Retriever>) -> Self {
        Self { llm, retriever }
    }

    /// Name of the LLM provider in use.
    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    /// Name of the retriever in use.
    pub fn retriever_name(&self) -> &str {
        self.retriever.name()
    }

    /// Tag every clause of `text`, in order.
    ///
    /// Clauses the model cannot abstract are left out of the result.
    pub async fn tag(&self, text: &str) -> Result<Vec<TaggedPlan>> {
        let mut tagged = Vec::new();

        for clause in split_clauses(text) {
            let response = self
                .llm
                .complete(&prompts::careplan_abstraction_prompt(clause))
                .await?;
            let Some(plan) = parse_careplan_abstraction(&response).value() else {
                debug!(clause, "no abstraction, skipping clause");
                continue;
            };

            let snippets = self.retriever.retrieve(&plan).await?;
            let answer = self
                .llm
                .complete(&prompts::icf_labeling_prompt(&format_context(&snippets), &plan))
                .await?;

            tagged.push(TaggedPlan {
                source: clause.to_string(),
                plan,
                icf_codes: split_code_list(&answer),
            });
        }

        Ok(tagged)
    }
}

/// Comma-separated clauses, trimmed, empties dropped.
pub fn split_clauses(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockProvider, PromptKind};
    use crate::retrieval::StaticRetriever;

    fn tagger(provider: MockProvider) -> Tagger {
        Tagger::new(Arc::new(provider), Arc::new(StaticRetriever::icf_sample()))
    }

    #[test]
    fn test_split_clauses() {
        let clauses: Vec<&str> = split_clauses(" 入浴支援 ,, 歩行訓練,").collect();
        assert_eq!(clauses, vec!["入浴支援", "歩行訓練"]);
    }

    #[tokio::test]
    async fn test_tag_each_clause() {
        let plans = tagger(MockProvider::new())
            .tag("週2回の入浴支援, 歩行訓練")
            .await
            .unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].source, "週2回の入浴支援");
        assert_eq!(plans[0].plan, "(入浴) 週2回の入浴支援");
        assert_eq!(plans[0].icf_codes, vec!["d510"]);
        assert_eq!(plans[1].icf_codes, vec!["d450"]);
    }

    #[tokio::test]
    async fn test_clause_without_abstraction_is_skipped() {
        let provider = MockProvider::new().with_response(PromptKind::CareplanAbstraction, |clause| {
            if clause == "見守り" {
                "特になし".to_string()
            } else {
                format!("abstraction: (活動) {}", clause)
            }
        });
        let provider = Arc::new(provider);
        let tagger = Tagger::new(provider.clone(), Arc::new(StaticRetriever::default()));

        let plans = tagger.tag("見守り, 食事介助").await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].source, "食事介助");
        assert_eq!(provider.call_count(PromptKind::IcfLabeling), 1);
    }

    #[tokio::test]
    async fn test_label_on_its_own_line() {
        let provider = MockProvider::new().with_response(PromptKind::CareplanAbstraction, |_| {
            "abstraction:\n（入浴）清潔を保てる".to_string()
        });
        let plans = tagger(provider).tag("入浴支援").await.unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].plan, "（入浴）清潔を保てる");
        assert_eq!(plans[0].icf_codes, vec!["d510"]);
    }

    #[tokio::test]
    async fn test_multiple_codes_are_split() {
        let provider =
            MockProvider::new().with_response(PromptKind::IcfLabeling, |_| "d450, d465".into());
        let plans = tagger(provider).tag("屋外歩行").await.unwrap();
        assert_eq!(plans[0].icf_codes, vec!["d450", "d465"]);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let provider = MockProvider::new().fail_on(PromptKind::IcfLabeling);
        assert!(tagger(provider).tag("入浴").await.is_err());
    }
}
