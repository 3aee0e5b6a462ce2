//! Reference-snippet retrieval for ICF labeling.
//!
//! The labeling prompt is grounded on a handful of ICF code descriptions
//! fetched from a search index with the abstraction as the query.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{CarelogError, Result};

/// Search API version.
pub const API_VERSION: &str = "2024-07-01";

/// Hits returned per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 3;

/// Document field holding the snippet text.
pub const DEFAULT_CONTENT_KEY: &str = "description";

/// Source of context snippets for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to the configured number of snippets for `query`.
    async fn retrieve(&self, query: &str) -> Result<Vec<String>>;

    /// Name for logging/debugging.
    fn name(&self) -> &str;
}

/// Join retrieved snippets into one context block.
pub fn format_context(snippets: &[String]) -> String {
    snippets.join("\n")
}

/// Azure AI Search keyword retriever.
pub struct AzureSearchRetriever {
    client: Client,
    endpoint: String,
    api_key: String,
    top_k: usize,
    content_key: String,
}

impl AzureSearchRetriever {
    /// Create a retriever for `index` on `service`.
    pub fn new(
        service: &str,
        index: &str,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CarelogError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "https://{}.search.windows.net/indexes/{}/docs/search?api-version={}",
                service, index, API_VERSION
            ),
            api_key: api_key.into(),
            top_k: DEFAULT_TOP_K,
            content_key: DEFAULT_CONTENT_KEY.to_string(),
        })
    }

    /// Create from loaded service configuration.
    pub fn from_config(config: &ServiceConfig, timeout_secs: u64) -> Result<Self> {
        Self::new(
            &config.search_service,
            &config.search_index,
            config.search_api_key.clone(),
            timeout_secs,
        )
    }

    /// Request URL including the API version.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("api-key"),
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| CarelogError::Config(format!("Invalid search API key: {}", e)))?,
        );
        Ok(headers)
    }

    fn snippets(&self, response: SearchResponse) -> Vec<String> {
        response
            .value
            .into_iter()
            .filter_map(|mut hit| match hit.remove(&self.content_key) {
                Some(Value::String(s)) => Some(s),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for AzureSearchRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let body = json!({ "search": query, "top": self.top_k });

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| CarelogError::Retrieval(format!("search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CarelogError::Retrieval(format!(
                "search error ({}): {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| CarelogError::Retrieval(format!("bad search response: {}", e)))?;

        let snippets = self.snippets(parsed);
        debug!(hits = snippets.len(), "retrieved context");
        Ok(snippets)
    }

    fn name(&self) -> &str {
        "azure-search"
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

/// Retriever answering every query with the same snippets.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    snippets: Vec<String>,
}

impl StaticRetriever {
    /// Create a retriever returning `snippets` for any query.
    pub fn new(snippets: Vec<String>) -> Self {
        Self { snippets }
    }

    /// A small set of common ICF activity codes.
    pub fn icf_sample() -> Self {
        Self::new(
            [
                "d450 歩行: 歩いて移動すること",
                "d510 自分の身体を洗うこと: 入浴やシャワー",
                "d550 食べること: 食事を口に運び食べること",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<String>> {
        Ok(self.snippets.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let r = AzureSearchRetriever::new("care-search", "icf-index", "key", 30).unwrap();
        assert_eq!(
            r.endpoint(),
            "https://care-search.search.windows.net/indexes/icf-index/docs/search?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_snippets_read_content_key() {
        let r = AzureSearchRetriever::new("s", "i", "k", 30).unwrap();
        let raw = r#"{"value":[
            {"@search.score":1.2,"description":"d450 歩行"},
            {"@search.score":0.9,"title":"no description"},
            {"@search.score":0.5,"description":"d550 食べること"}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(r.snippets(parsed), vec!["d450 歩行", "d550 食べること"]);
    }

    #[test]
    fn test_format_context() {
        let ctx = format_context(&["a".to_string(), "b".to_string()]);
        assert_eq!(ctx, "a\nb");
        assert_eq!(format_context(&[]), "");
    }

    #[tokio::test]
    async fn test_static_retriever() {
        let r = StaticRetriever::icf_sample();
        let hits = r.retrieve("anything").await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(r.name(), "static");
    }
}
