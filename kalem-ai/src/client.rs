use std::sync::Arc;

use tracing::{debug, info};

use kalem_common::models::Analysis;
use kalem_common::Error;

use crate::models::AnalysisRequest;
use crate::prompt::build_analysis_prompt;
use crate::response::{parse_analysis, strip_code_fences};
use crate::traits::ModelProvider;

/// Boundary to the external analysis capability.
///
/// One call to [`AnalysisClient::analyze`] is exactly one provider request:
/// no retries, no caching. Retrying is up to the caller.
#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn ModelProvider>,
    model: String,
    max_tokens: u32,
}

impl AnalysisClient {
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;

    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the payload for `user_text` without sending it.
    pub fn build_request(&self, user_text: &str) -> AnalysisRequest {
        AnalysisRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            prompt: build_analysis_prompt(user_text),
        }
    }

    /// Asks the model to analyse `user_text` and returns its answer with any
    /// surrounding code fences removed.
    pub async fn analyze(&self, user_text: &str) -> Result<String, Error> {
        let request = self.build_request(user_text);
        debug!(
            "Sending analysis request to '{}' (model={}, prompt_len={})",
            self.provider.name(),
            request.model,
            request.prompt.len()
        );

        let raw = self.provider.complete(&request).await?;
        Ok(strip_code_fences(&raw).to_string())
    }

    /// [`AnalysisClient::analyze`] followed by validation.
    pub async fn analyze_structured(&self, user_text: &str) -> Result<Analysis, Error> {
        let text = self.analyze(user_text).await?;
        let analysis = parse_analysis(&text)?;
        info!(
            "Analysis complete: {} corrections, {} deyimler, {} mistake patterns",
            analysis.corrections.len(),
            analysis.suggested_idioms.len(),
            analysis.mistake_patterns.len()
        );
        Ok(analysis)
    }
}
