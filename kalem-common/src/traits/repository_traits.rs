use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{AnalysisRecord, Exercise, MasteryLevel, MistakePattern, MistakeStat};

#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    async fn create_exercise(&self, exercise: &Exercise) -> Result<(), Error>;
    async fn get_exercise(&self, exercise_id: Uuid) -> Result<Option<Exercise>, Error>;
    /// Newest first.
    async fn list_exercises_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Exercise>, Error>;
}

#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Write-once; a second insert for the same exercise must fail.
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<(), Error>;
    async fn get_analysis_for_exercise(&self, exercise_id: Uuid) -> Result<Option<AnalysisRecord>, Error>;
    /// Every analysis whose exercise belongs to `user_id`, newest first.
    async fn list_analyses_for_user(&self, user_id: Uuid) -> Result<Vec<AnalysisRecord>, Error>;
}

#[async_trait]
pub trait MistakeStatRepository: Send + Sync {
    /// Insert-or-increment keyed on `(user_id, pattern.description)`, as a
    /// single atomic storage operation. Returns the row after the write.
    async fn record_occurrence(
        &self,
        user_id: Uuid,
        pattern: &MistakePattern,
        seen_at: DateTime<Utc>,
    ) -> Result<MistakeStat, Error>;

    async fn get_by_pattern(&self, user_id: Uuid, pattern: &str) -> Result<Option<MistakeStat>, Error>;

    /// Ordered by occurrences, then most recently seen.
    async fn list_top_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<MistakeStat>, Error>;

    /// Returns `None` when no row with that id belongs to `user_id`.
    async fn set_mastery_level(
        &self,
        user_id: Uuid,
        mistake_id: Uuid,
        level: MasteryLevel,
    ) -> Result<Option<MistakeStat>, Error>;
}
