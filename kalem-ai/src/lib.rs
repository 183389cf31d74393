pub mod client;
pub mod models;
pub mod prompt;
pub mod provider;
pub mod response;
pub mod stub;
pub mod traits;

// Re-export public APIs
pub use client::AnalysisClient;
pub use models::{AnalysisRequest, ProviderConfig};
pub use provider::{AnthropicProvider, OpenAIProvider, Provider};
pub use response::{parse_analysis, strip_code_fences};
pub use stub::StubProvider;
pub use traits::ModelProvider;
