use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use kalem_common::Error;

use crate::models::{AnalysisRequest, ProviderConfig};
use crate::traits::ModelProvider;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Sends the request and turns transport failures and non-success statuses
/// into [`Error::AnalysisService`]. Returns the raw body on success.
async fn send_for_body(provider: &str, request: reqwest::RequestBuilder) -> Result<String, Error> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::AnalysisService(format!("{} request failed: {}", provider, e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        error!("{} API error ({}): {}", provider, status, error_text);
        return Err(Error::AnalysisService(format!(
            "{} API error: {}",
            provider,
            status.as_u16()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| Error::AnalysisFormat(format!("{} response body unreadable: {}", provider, e)))
}

fn parse_body(provider: &str, body: &str) -> Result<Value, Error> {
    serde_json::from_str::<Value>(body).map_err(|e| {
        error!("Failed to parse {} response as JSON: {:?}", provider, e);
        Error::AnalysisFormat(format!("{} returned non-JSON response: {}", provider, e))
    })
}

/// Text of the first `text` block of an Anthropic Messages API response.
pub(crate) fn extract_anthropic_text(body: &str) -> Result<String, Error> {
    let data = parse_body("Anthropic", body)?;

    let content = data.get("content").and_then(|c| c.as_array()).ok_or_else(|| {
        Error::AnalysisFormat("Anthropic response missing 'content' array".to_string())
    })?;

    content
        .iter()
        .find(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| Error::AnalysisFormat("Anthropic response has no text block".to_string()))
}

/// Message content of the first choice of an OpenAI chat completion.
pub(crate) fn extract_openai_text(body: &str) -> Result<String, Error> {
    let data = parse_body("OpenAI", body)?;

    let choices = data.get("choices").and_then(|c| c.as_array()).ok_or_else(|| {
        Error::AnalysisFormat("OpenAI response missing 'choices' array".to_string())
    })?;

    choices
        .first()
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|c| c.as_str())
        .map(|c| c.to_string())
        .ok_or_else(|| Error::AnalysisFormat("OpenAI response has no message content".to_string()))
}

/// Anthropic provider implementation (Messages API)
pub struct AnthropicProvider {
    config: ProviderConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, Error> {
        let api_base = self
            .config
            .api_base
            .clone()
            .unwrap_or_else(|| ANTHROPIC_API_BASE.to_string());

        debug!("Calling {}/messages with model {}", api_base, request.model);

        let http_request = self
            .client
            .post(format!("{}/messages", api_base))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": request.model,
                "max_tokens": request.max_tokens,
                "messages": [
                    { "role": "user", "content": request.prompt }
                ],
            }));

        let body = send_for_body("Anthropic", http_request).await?;
        extract_anthropic_text(&body)
    }
}

/// OpenAI provider implementation (chat completions)
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, Error> {
        let api_base = self
            .config
            .api_base
            .clone()
            .unwrap_or_else(|| OPENAI_API_BASE.to_string());

        let mut messages = Vec::new();
        if let Some(system_prompt) = self.config.options.get("system_prompt") {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        debug!("Calling {}/chat/completions with model {}", api_base, request.model);

        let http_request = self
            .client
            .post(format!("{}/chat/completions", api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&json!({
                "model": request.model,
                "messages": messages,
                "max_tokens": request.max_tokens,
            }));

        let body = send_for_body("OpenAI", http_request).await?;
        extract_openai_text(&body)
    }
}

/// Registry of configured providers, looked up by name
pub struct Provider {
    providers: Arc<RwLock<HashMap<String, Arc<dyn ModelProvider>>>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a provider under its own name
    pub async fn register<P: ModelProvider + 'static>(&self, provider: P) {
        let mut providers = self.providers.write().await;
        info!("Registered model provider '{}'", provider.name());
        providers.insert(provider.name().to_string(), Arc::new(provider));
    }

    /// Get a provider by name
    pub async fn get(&self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        let providers = self.providers.read().await;
        providers.get(name).cloned()
    }

    /// Names of all registered providers
    pub async fn get_all(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        providers.keys().cloned().collect()
    }

    /// Build and register the provider named by `config.provider_type`
    pub async fn register_from_config(&self, config: ProviderConfig) -> Result<(), Error> {
        match config.provider_type.as_str() {
            "anthropic" => self.register(AnthropicProvider::new(config)).await,
            "openai" => self.register(OpenAIProvider::new(config)).await,
            other => {
                return Err(Error::Config(format!("Unknown provider type: {}", other)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_text_block_is_extracted() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"```json\n{}\n```"}],"stop_reason":"end_turn"}"#;
        assert_eq!(extract_anthropic_text(body).unwrap(), "```json\n{}\n```");
    }

    #[test]
    fn anthropic_without_text_block_is_format_error() {
        for body in [
            r#"{"content":[]}"#,
            r#"{"content":[{"type":"tool_use","id":"x"}]}"#,
            r#"{"type":"error"}"#,
            "<html>bad gateway</html>",
        ] {
            let err = extract_anthropic_text(body).unwrap_err();
            assert!(matches!(err, Error::AnalysisFormat(_)), "{body}");
        }
    }

    #[test]
    fn openai_message_content_is_extracted() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"corrections\":[]}"}}]}"#;
        assert_eq!(extract_openai_text(body).unwrap(), "{\"corrections\":[]}");
    }

    #[test]
    fn openai_without_choices_is_format_error() {
        let err = extract_openai_text(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, Error::AnalysisFormat(_)));
    }

    #[tokio::test]
    async fn registry_builds_from_config() {
        let registry = Provider::new();
        let config = ProviderConfig {
            provider_type: "anthropic".to_string(),
            api_base: None,
            api_key: "test".to_string(),
            default_model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            options: HashMap::new(),
        };
        registry.register_from_config(config.clone()).await.unwrap();
        assert!(registry.get("anthropic").await.is_some());
        assert!(registry.get("openai").await.is_none());

        let unknown = ProviderConfig { provider_type: "llama".to_string(), ..config };
        assert!(matches!(
            registry.register_from_config(unknown).await,
            Err(Error::Config(_))
        ));
    }
}
