// ================================================================
// File: kalem-common/src/error.rs
// ================================================================

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty required input. Raised before any external call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The analysis capability was unreachable or answered with a non-success status.
    #[error("Analysis service error: {0}")]
    AnalysisService(String),

    /// The analysis capability answered, but no text could be extracted from the body.
    #[error("Analysis format error: {0}")]
    AnalysisFormat(String),

    /// The extracted text is not a structured analysis object.
    #[error("Malformed analysis: {0}")]
    MalformedAnalysis(String),

    /// The analysis record could not be stored.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Exercise {0} has already been analyzed")]
    AlreadyAnalyzed(Uuid),

    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// True for failures the caller may reasonably retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::AnalysisService(_) | Error::Http(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
