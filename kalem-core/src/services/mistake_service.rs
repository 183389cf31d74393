use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use kalem_common::models::{MasteryLevel, MistakePattern, MistakeStat};
use kalem_common::traits::repository_traits::MistakeStatRepository;

use crate::Error;

/// Per-user running statistics of recurring mistakes.
#[derive(Clone)]
pub struct MistakeTracker {
    repo: Arc<dyn MistakeStatRepository>,
}

impl MistakeTracker {
    pub const DEFAULT_TOP_LIMIT: i64 = 10;

    pub fn new(repo: Arc<dyn MistakeStatRepository>) -> Self {
        Self { repo }
    }

    /// Counts one more occurrence of `pattern` for `user_id`.
    ///
    /// First sighting creates the stat with count 1 and mastery 0; later ones
    /// bump the count and replace the examples and `last_seen`. Mastery is
    /// left alone. The storage layer does this as one atomic upsert.
    pub async fn record(&self, user_id: Uuid, pattern: &MistakePattern) -> Result<MistakeStat, Error> {
        let stat = self.repo.record_occurrence(user_id, pattern, Utc::now()).await?;
        debug!(
            "Mistake pattern '{}' for user {} now at {} occurrence(s)",
            stat.pattern, user_id, stat.occurrences
        );
        Ok(stat)
    }

    /// Sets the user's self-assessed mastery (0-5) for one of their stats.
    pub async fn set_mastery(&self, user_id: Uuid, mistake_id: Uuid, level: i32) -> Result<MistakeStat, Error> {
        let level = MasteryLevel::try_from(level)?;
        self.repo
            .set_mastery_level(user_id, mistake_id, level)
            .await?
            .ok_or_else(|| Error::NotFound(format!("mistake {} not found", mistake_id)))
    }

    /// Most frequent mistakes first.
    pub async fn top_mistakes(&self, user_id: Uuid, limit: i64) -> Result<Vec<MistakeStat>, Error> {
        if limit <= 0 {
            return Err(Error::InvalidRequest("limit must be positive".to_string()));
        }
        self.repo.list_top_for_user(user_id, limit).await
    }

    pub async fn get(&self, user_id: Uuid, pattern: &str) -> Result<Option<MistakeStat>, Error> {
        self.repo.get_by_pattern(user_id, pattern).await
    }
}
