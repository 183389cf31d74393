use std::sync::Arc;

use uuid::Uuid;

use kalem_ai::{AnalysisClient, StubProvider};
use kalem_common::models::Exercise;

use crate::Error;
use crate::routes::AppState;
use crate::services::{AnalysisService, ExerciseService, IdiomLibrary, MistakeTracker};
use crate::test_utils::fixtures::SAMPLE_TEXT;
use crate::test_utils::memory::{
    InMemoryAnalysisRepository, InMemoryExerciseRepository, InMemoryMistakeStatRepository,
};

/// Services wired to in-memory storage and a stub model. The repositories
/// stay reachable so tests can inspect and sabotage them.
pub struct TestHarness {
    pub stub: Arc<StubProvider>,
    pub exercises: Arc<InMemoryExerciseRepository>,
    pub analyses: Arc<InMemoryAnalysisRepository>,
    pub mistakes: Arc<InMemoryMistakeStatRepository>,
    pub analysis_service: Arc<AnalysisService>,
    pub exercise_service: ExerciseService,
    pub tracker: MistakeTracker,
    pub idioms: IdiomLibrary,
}

impl TestHarness {
    pub fn new(stub: StubProvider) -> Self {
        let stub = Arc::new(stub);
        let exercises = Arc::new(InMemoryExerciseRepository::new());
        let analyses = Arc::new(InMemoryAnalysisRepository::new(exercises.clone()));
        let mistakes = Arc::new(InMemoryMistakeStatRepository::new());

        let client = AnalysisClient::new(stub.clone(), "stub-model");
        let tracker = MistakeTracker::new(mistakes.clone());
        let analysis_service = Arc::new(AnalysisService::new(
            client,
            exercises.clone(),
            analyses.clone(),
            tracker.clone(),
        ));

        Self {
            stub,
            exercise_service: ExerciseService::new(exercises.clone()),
            idioms: IdiomLibrary::new(analyses.clone()),
            exercises,
            analyses,
            mistakes,
            analysis_service,
            tracker,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            analysis: self.analysis_service.clone(),
            exercises: self.exercise_service.clone(),
            mistakes: self.tracker.clone(),
            idioms: self.idioms.clone(),
        }
    }

    /// Stores an exercise with the sample text for `user_id`.
    pub async fn exercise_for(&self, user_id: Uuid) -> Result<Exercise, Error> {
        self.exercise_service
            .submit(user_id, ExerciseService::random_prompt(), SAMPLE_TEXT)
            .await
    }
}
