//! CLI command implementations.

pub mod evaluate;
pub mod serve;
pub mod split;

use std::sync::Arc;

use carelog::ServiceConfig;
use carelog::llm::{LlmConfig, LlmProvider, MockProvider, OpenAIProvider};
use carelog::retrieval::{AzureSearchRetriever, Retriever, StaticRetriever};

/// LLM and retrieval backends for one command.
pub struct Backends {
    pub llm: Arc<dyn LlmProvider>,
    pub retriever: Arc<dyn Retriever>,
    /// Service configuration, absent in mock mode.
    pub service: Option<ServiceConfig>,
}

/// Build the live backends from the environment, or the offline mocks.
///
/// Live mode fails before any processing when a required variable is unset.
pub fn backends(mock_llm: bool, llm_config: LlmConfig) -> carelog::Result<Backends> {
    if mock_llm {
        return Ok(Backends {
            llm: Arc::new(MockProvider::with_config(llm_config)),
            retriever: Arc::new(StaticRetriever::icf_sample()),
            service: None,
        });
    }

    let service = ServiceConfig::from_env()?;
    let timeout = llm_config.timeout_secs;
    let llm = OpenAIProvider::from_config(&service, llm_config)?;
    let retriever = AzureSearchRetriever::from_config(&service, timeout)?;

    Ok(Backends {
        llm: Arc::new(llm),
        retriever: Arc::new(retriever),
        service: Some(service),
    })
}
