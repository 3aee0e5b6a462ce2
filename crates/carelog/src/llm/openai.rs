//! OpenAI chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{CarelogError, Result};

use super::provider::{LlmConfig, LlmProvider, Prompt};

/// OpenAI API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

const PROVIDER: &str = "openai";

/// OpenAI GPT provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    api_url: String,
    config: LlmConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, LlmConfig::default())
    }

    /// Create a new OpenAI provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CarelogError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: API_URL.to_string(),
            config,
        })
    }

    /// Create from loaded service configuration.
    ///
    /// The model and base URL from `service` override those in `config`.
    pub fn from_config(service: &ServiceConfig, mut config: LlmConfig) -> Result<Self> {
        config.model = service.model.clone();
        let provider = Self::with_config(service.openai_api_key.clone(), config)?;
        Ok(match &service.openai_base_url {
            Some(url) => provider.with_api_url(url),
            None => provider,
        })
    }

    /// Point the provider at a compatible endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| CarelogError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    fn request_body(&self, user_prompt: &str) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });
        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_completion_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        debug!(kind = %prompt.kind, model = %self.config.model, "sending prompt");

        let response = self
            .client
            .post(&self.api_url)
            .headers(self.build_headers()?)
            .json(&self.request_body(&prompt.text))
            .send()
            .await
            .map_err(|e| CarelogError::llm(PROVIDER, format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CarelogError::llm(
                PROVIDER,
                format!("API error ({}): {}", status, error_text),
            ));
        }

        let api_response: OpenAIResponse = response.json().await.map_err(|e| {
            CarelogError::llm(PROVIDER, format!("Failed to parse API response: {}", e))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CarelogError::llm(PROVIDER, "No response content"))
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_omits_unset_sampling_fields() {
        let provider = OpenAIProvider::new("sk-test").unwrap();
        let body = provider.request_body("hello");

        assert_eq!(body["model"], "gpt-5-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_completion_tokens").is_none());
    }

    #[test]
    fn test_body_carries_temperature() {
        let config = LlmConfig {
            temperature: Some(0.0),
            max_tokens: Some(256),
            ..Default::default()
        };
        let provider = OpenAIProvider::with_config("sk-test", config).unwrap();
        let body = provider.request_body("x");

        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_completion_tokens"], 256);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"d450"}}]}"#;
        let parsed: OpenAIResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("d450"));
    }
}
