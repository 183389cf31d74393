use async_trait::async_trait;
use kalem_common::Error;

use crate::models::AnalysisRequest;

/// A language model that can answer a single instruction with text.
///
/// Implementations make exactly one outbound request per call. Transport
/// failures and non-success statuses map to [`Error::AnalysisService`]; a body
/// without extractable text maps to [`Error::AnalysisFormat`].
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, Error>;
}
