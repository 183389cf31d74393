use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a user's idiom library, derived from every stored analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomView {
    pub idiom: String,
    pub meaning: String,
    pub usage_note: String,
    pub example_in_context: String,
    pub occurrences: u32,
    pub last_seen: DateTime<Utc>,
}

/// Footer numbers for an idiom library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomSummary {
    /// Number of distinct idioms.
    pub distinct: usize,
    /// Sum of all occurrence counts.
    pub total: u64,
    /// Highest single occurrence count, 0 for an empty library.
    pub most_frequent: u32,
}

impl IdiomSummary {
    pub fn from_views(views: &[IdiomView]) -> Self {
        Self {
            distinct: views.len(),
            total: views.iter().map(|v| v.occurrences as u64).sum(),
            most_frequent: views.iter().map(|v| v.occurrences).max().unwrap_or(0),
        }
    }
}
