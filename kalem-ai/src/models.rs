use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Configuration for an AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The type of provider ("anthropic" or "openai")
    pub provider_type: String,

    /// Base URL for API requests; the provider's public endpoint when unset
    pub api_base: Option<String>,

    /// API key for authentication
    pub api_key: String,

    /// Model identifier sent with every request
    pub default_model: String,

    /// Upper bound on the length of the answer
    pub max_tokens: u32,

    /// Additional provider-specific configuration options
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// The payload handed to a [`crate::ModelProvider`]: one instruction string
/// plus the model that should answer it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub model: String,
    pub max_tokens: u32,
    pub prompt: String,
}
