//! The submission pipeline: validate input, ask the model, store the
//! analysis, then fold its mistake patterns into the user's statistics.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use kalem_ai::AnalysisClient;
use kalem_common::models::{Analysis, AnalysisRecord};
use kalem_common::traits::repository_traits::{AnalysisRepository, ExerciseRepository};

use crate::services::mistake_service::MistakeTracker;
use crate::Error;

/// What [`AnalysisService::persist`] managed to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    pub analysis_id: Uuid,
    pub patterns_recorded: usize,
    pub patterns_skipped: usize,
}

pub struct AnalysisService {
    client: AnalysisClient,
    exercises: Arc<dyn ExerciseRepository>,
    analyses: Arc<dyn AnalysisRepository>,
    mistakes: MistakeTracker,
}

impl AnalysisService {
    pub fn new(
        client: AnalysisClient,
        exercises: Arc<dyn ExerciseRepository>,
        analyses: Arc<dyn AnalysisRepository>,
        mistakes: MistakeTracker,
    ) -> Self {
        Self {
            client,
            exercises,
            analyses,
            mistakes,
        }
    }

    /// Runs the whole pipeline for one submission and returns the validated
    /// analysis. Nothing is written unless the model's answer validates.
    ///
    /// Each exercise can be analysed once; a second call fails with
    /// [`Error::AlreadyAnalyzed`] before the model is contacted.
    pub async fn analyze_submission(
        &self,
        exercise_id: Uuid,
        user_text: &str,
        user_id: Uuid,
    ) -> Result<Analysis, Error> {
        if exercise_id.is_nil() || user_text.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "exerciseId and userText required".to_string(),
            ));
        }

        info!("Analyzing text for exercise: {}", exercise_id);
        info!("Text length: {} characters", user_text.chars().count());

        let exercise = self
            .exercises
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("exercise {} not found", exercise_id)))?;
        if exercise.user_id != user_id {
            warn!(
                "User {} tried to analyze exercise {} owned by someone else",
                user_id, exercise_id
            );
            return Err(Error::InvalidRequest(
                "exercise does not belong to this user".to_string(),
            ));
        }

        if self.analyses.get_analysis_for_exercise(exercise_id).await?.is_some() {
            return Err(Error::AlreadyAnalyzed(exercise_id));
        }

        let analysis = self.client.analyze_structured(user_text).await?;

        self.persist(exercise_id, user_id, &analysis).await?;

        Ok(analysis)
    }

    /// Stores `analysis` for `exercise_id`, then records each mistake pattern.
    ///
    /// If the analysis insert fails nothing else is written. A failing pattern
    /// is logged and skipped; the remaining patterns are still recorded.
    /// Completed writes are not rolled back if the caller goes away midway.
    pub async fn persist(
        &self,
        exercise_id: Uuid,
        user_id: Uuid,
        analysis: &Analysis,
    ) -> Result<PersistOutcome, Error> {
        let record = AnalysisRecord::from_analysis(exercise_id, analysis, Utc::now());

        if let Err(e) = self.analyses.insert_analysis(&record).await {
            error!("Error saving analysis for exercise {}: {}", exercise_id, e);
            return Err(match e {
                Error::AlreadyAnalyzed(id) => Error::AlreadyAnalyzed(id),
                other => Error::Persistence(other.to_string()),
            });
        }

        let mut outcome = PersistOutcome {
            analysis_id: record.analysis_id,
            patterns_recorded: 0,
            patterns_skipped: 0,
        };

        for pattern in &analysis.mistake_patterns {
            match self.mistakes.record(user_id, pattern).await {
                Ok(_) => outcome.patterns_recorded += 1,
                Err(e) => {
                    warn!(
                        "Skipping mistake pattern '{}' for user {}: {}",
                        pattern.description, user_id, e
                    );
                    outcome.patterns_skipped += 1;
                }
            }
        }

        info!(
            "Stored analysis {} for exercise {} ({} patterns recorded, {} skipped)",
            outcome.analysis_id, exercise_id, outcome.patterns_recorded, outcome.patterns_skipped
        );
        Ok(outcome)
    }
}
