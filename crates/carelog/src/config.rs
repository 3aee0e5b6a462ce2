//! Service configuration loaded once at startup.
//!
//! Credentials for the LLM and search backends come from the environment
//! (optionally seeded from `.env.local` / `.env`). The resulting
//! [`ServiceConfig`] is built once and handed by reference to every stage.

use crate::error::{CarelogError, Result};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable naming the Azure AI Search service.
pub const SEARCH_SERVICE_NAME: &str = "AZURE_AI_SEARCH_SERVICE_NAME";
/// Environment variable holding the Azure AI Search key.
pub const SEARCH_API_KEY: &str = "AZURE_SEARCH_API_KEY";
/// Environment variable naming the Azure AI Search index.
pub const SEARCH_INDEX_NAME: &str = "AZURE_AI_SEARCH_INDEX_NAME";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Credentials and endpoints for the external backends.
#[derive(Clone)]
pub struct ServiceConfig {
    /// OpenAI API key.
    pub openai_api_key: String,
    /// Chat model name (`OPENAI_MODEL`, default `gpt-5-mini`).
    pub model: String,
    /// Override for the chat-completions base URL (`OPENAI_BASE_URL`).
    pub openai_base_url: Option<String>,
    /// Azure AI Search service name.
    pub search_service: String,
    /// Azure AI Search API key.
    pub search_api_key: String,
    /// Azure AI Search index name.
    pub search_index: String,
    /// Names the anonymizer always masks (`CARELOG_KNOWN_NAMES`, comma-separated).
    pub known_names: Vec<String>,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// `.env.local` and `.env` are read first when present; values already
    /// set in the environment win.
    pub fn from_env() -> Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Every missing required key is reported in one error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = [
            OPENAI_API_KEY,
            SEARCH_SERVICE_NAME,
            SEARCH_API_KEY,
            SEARCH_INDEX_NAME,
        ]
        .into_iter()
        .filter(|key| value(*key).is_none())
        .collect();

        if !missing.is_empty() {
            return Err(CarelogError::Config(format!(
                "required environment variables not set: {}",
                missing.join(", ")
            )));
        }

        let require = |key: &str| value(key).unwrap_or_default();

        Ok(Self {
            openai_api_key: require(OPENAI_API_KEY),
            model: value("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: value("OPENAI_BASE_URL"),
            search_service: require(SEARCH_SERVICE_NAME),
            search_api_key: require(SEARCH_API_KEY),
            search_index: require(SEARCH_INDEX_NAME),
            known_names: value("CARELOG_KNOWN_NAMES")
                .map(|names| {
                    names
                        .split(',')
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("openai_api_key", &"<redacted>")
            .field("model", &self.model)
            .field("openai_base_url", &self.openai_base_url)
            .field("search_service", &self.search_service)
            .field("search_api_key", &"<redacted>")
            .field("search_index", &self.search_index)
            .field("known_names", &self.known_names.len())
            .finish()
    }
}
