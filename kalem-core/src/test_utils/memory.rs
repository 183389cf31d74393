use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use kalem_common::models::{AnalysisRecord, Exercise, MasteryLevel, MistakePattern, MistakeStat};
use kalem_common::traits::repository_traits::{
    AnalysisRepository, ExerciseRepository, MistakeStatRepository,
};

use crate::Error;

#[derive(Default)]
pub struct InMemoryExerciseRepository {
    exercises: DashMap<Uuid, Exercise>,
}

impl InMemoryExerciseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    fn owner_of(&self, exercise_id: Uuid) -> Option<Uuid> {
        self.exercises.get(&exercise_id).map(|e| e.user_id)
    }
}

#[async_trait]
impl ExerciseRepository for InMemoryExerciseRepository {
    async fn create_exercise(&self, exercise: &Exercise) -> Result<(), Error> {
        self.exercises.insert(exercise.exercise_id, exercise.clone());
        Ok(())
    }

    async fn get_exercise(&self, exercise_id: Uuid) -> Result<Option<Exercise>, Error> {
        Ok(self.exercises.get(&exercise_id).map(|e| e.clone()))
    }

    async fn list_exercises_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Exercise>, Error> {
        let mut list: Vec<Exercise> = self
            .exercises
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list.truncate(limit.max(0) as usize);
        Ok(list)
    }
}

/// Resolves ownership through the exercise repository, like the SQL join.
pub struct InMemoryAnalysisRepository {
    exercises: Arc<InMemoryExerciseRepository>,
    analyses: DashMap<Uuid, AnalysisRecord>,
    fail_inserts: AtomicBool,
}

impl InMemoryAnalysisRepository {
    pub fn new(exercises: Arc<InMemoryExerciseRepository>) -> Self {
        Self {
            exercises,
            analyses: DashMap::new(),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// Makes every following insert fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryAnalysisRepository {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<(), Error> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        match self.analyses.entry(record.exercise_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::AlreadyAnalyzed(record.exercise_id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get_analysis_for_exercise(&self, exercise_id: Uuid) -> Result<Option<AnalysisRecord>, Error> {
        Ok(self.analyses.get(&exercise_id).map(|a| a.clone()))
    }

    async fn list_analyses_for_user(&self, user_id: Uuid) -> Result<Vec<AnalysisRecord>, Error> {
        let mut list: Vec<AnalysisRecord> = self
            .analyses
            .iter()
            .filter(|a| self.exercises.owner_of(a.exercise_id) == Some(user_id))
            .map(|a| a.clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

/// Keyed on `(user_id, pattern)`. The DashMap entry lock makes each
/// insert-or-increment atomic, like the SQL upsert.
#[derive(Default)]
pub struct InMemoryMistakeStatRepository {
    stats: DashMap<(Uuid, String), MistakeStat>,
    failing_patterns: DashSet<String>,
    writes: AtomicUsize,
}

impl InMemoryMistakeStatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `record_occurrence` fail for this pattern description.
    pub fn fail_on_pattern(&self, pattern: impl Into<String>) {
        self.failing_patterns.insert(pattern.into());
    }

    /// Number of successful upserts so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

#[async_trait]
impl MistakeStatRepository for InMemoryMistakeStatRepository {
    async fn record_occurrence(
        &self,
        user_id: Uuid,
        pattern: &MistakePattern,
        seen_at: DateTime<Utc>,
    ) -> Result<MistakeStat, Error> {
        if self.failing_patterns.contains(&pattern.description) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }

        let entry = self
            .stats
            .entry((user_id, pattern.description.clone()))
            .and_modify(|stat| {
                stat.occurrences += 1;
                stat.example_wrong = pattern.example_wrong.clone();
                stat.example_correct = pattern.example_correct.clone();
                stat.last_seen = seen_at;
            })
            .or_insert_with(|| MistakeStat {
                mistake_id: Uuid::new_v4(),
                user_id,
                pattern: pattern.description.clone(),
                category: pattern.category.clone(),
                example_wrong: pattern.example_wrong.clone(),
                example_correct: pattern.example_correct.clone(),
                occurrences: 1,
                mastery_level: MasteryLevel::default(),
                last_seen: seen_at,
                created_at: seen_at,
            });

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(entry.value().clone())
    }

    async fn get_by_pattern(&self, user_id: Uuid, pattern: &str) -> Result<Option<MistakeStat>, Error> {
        Ok(self
            .stats
            .get(&(user_id, pattern.to_string()))
            .map(|s| s.clone()))
    }

    async fn list_top_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<MistakeStat>, Error> {
        let mut list: Vec<MistakeStat> = self
            .stats
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.clone())
            .collect();
        list.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| b.last_seen.cmp(&a.last_seen))
        });
        list.truncate(limit.max(0) as usize);
        Ok(list)
    }

    async fn set_mastery_level(
        &self,
        user_id: Uuid,
        mistake_id: Uuid,
        level: MasteryLevel,
    ) -> Result<Option<MistakeStat>, Error> {
        let updated = self
            .stats
            .iter_mut()
            .find(|s| s.mistake_id == mistake_id && s.user_id == user_id)
            .map(|mut s| {
                s.mastery_level = level;
                s.clone()
            });
        Ok(updated)
    }
}
