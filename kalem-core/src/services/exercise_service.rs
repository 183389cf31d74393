use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::info;
use uuid::Uuid;

use kalem_common::models::Exercise;
use kalem_common::traits::repository_traits::ExerciseRepository;

use crate::Error;

/// Daily writing topics. Learners answer in Turkish.
pub const WRITING_PROMPTS: [&str; 5] = [
    "Beschreibe deine letzte Geschäftsverhandlung",
    "Was ist deine Meinung zur aktuellen Wirtschaftslage?",
    "Erzähle von einem spannenden Fußballspiel",
    "Wie würdest du ein neues Projekt im Team vorschlagen?",
    "Beschreibe einen politischen Konflikt aus türkischer Perspektive",
];

/// Submissions shorter than this (after trimming) are rejected.
pub const MIN_TEXT_CHARS: usize = 50;

#[derive(Clone)]
pub struct ExerciseService {
    repo: Arc<dyn ExerciseRepository>,
}

impl ExerciseService {
    pub const DEFAULT_LIST_LIMIT: i64 = 10;

    pub fn new(repo: Arc<dyn ExerciseRepository>) -> Self {
        Self { repo }
    }

    pub fn random_prompt() -> &'static str {
        WRITING_PROMPTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(WRITING_PROMPTS[0])
    }

    /// Stores a new exercise for `user_id`. The text is kept exactly as
    /// submitted; only the length check looks at the trimmed form.
    pub async fn submit(&self, user_id: Uuid, prompt: &str, user_text: &str) -> Result<Exercise, Error> {
        let length = user_text.trim().chars().count();
        if length < MIN_TEXT_CHARS {
            return Err(Error::InvalidRequest(format!(
                "text must be at least {} characters, got {}",
                MIN_TEXT_CHARS, length
            )));
        }

        let exercise = Exercise::new(user_id, prompt, user_text);
        self.repo.create_exercise(&exercise).await?;
        info!(
            "Stored exercise {} for user {} ({} words)",
            exercise.exercise_id, user_id, exercise.word_count
        );
        Ok(exercise)
    }

    /// Newest first.
    pub async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<Exercise>, Error> {
        if limit <= 0 {
            return Err(Error::InvalidRequest("limit must be positive".to_string()));
        }
        self.repo.list_exercises_for_user(user_id, limit).await
    }
}
