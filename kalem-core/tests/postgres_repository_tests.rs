// File: kalem-core/tests/postgres_repository_tests.rs
//
// Needs a disposable Postgres: TEST_DATABASE_URL=postgres://... cargo test -- --ignored

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use kalem_common::models::{Analysis, AnalysisRecord, Category, Exercise, MasteryLevel, MistakePattern};
use kalem_common::traits::repository_traits::{
    AnalysisRepository, ExerciseRepository, MistakeStatRepository,
};
use kalem_core::repositories::{
    PostgresAnalysisRepository, PostgresExerciseRepository, PostgresMistakeStatRepository,
};
use kalem_core::test_utils::fixtures::{sample_answer, SAMPLE_TEXT};
use kalem_core::{Database, Error};

async fn setup_test_database() -> Result<Database, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .map_err(|_| Error::Config("TEST_DATABASE_URL is not set".to_string()))?;
    let db = Database::new(&url).await?;
    db.migrate().await?;
    Ok(db)
}

fn pattern(description: &str, wrong: &str) -> MistakePattern {
    MistakePattern {
        description: description.to_string(),
        category: Category::Grammar,
        example_wrong: wrong.to_string(),
        example_correct: "doğru".to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn test_exercise_and_analysis_round_trip() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let exercises = PostgresExerciseRepository::new(db.pool().clone());
    let analyses = PostgresAnalysisRepository::new(db.pool().clone());

    let user = Uuid::new_v4();
    let exercise = Exercise::new(user, "Beschreibe deinen Tag", SAMPLE_TEXT);
    exercises.create_exercise(&exercise).await?;
    let stored = exercises.get_exercise(exercise.exercise_id).await?.expect("exercise stored");
    assert_eq!(stored.user_text, SAMPLE_TEXT);
    assert_eq!(stored.word_count, exercise.word_count);

    let analysis: Analysis = kalem_ai::parse_analysis(&sample_answer("evda", "evde").to_string())?;
    let record = AnalysisRecord::from_analysis(exercise.exercise_id, &analysis, Utc::now());
    analyses.insert_analysis(&record).await?;

    let loaded = analyses
        .get_analysis_for_exercise(exercise.exercise_id)
        .await?
        .expect("analysis stored");
    assert_eq!(loaded.corrections, analysis.corrections);
    assert_eq!(loaded.variants, analysis.variants);
    assert_eq!(loaded.suggested_idioms, analysis.suggested_idioms);

    let duplicate = AnalysisRecord::from_analysis(exercise.exercise_id, &analysis, Utc::now());
    assert!(matches!(
        analyses.insert_analysis(&duplicate).await,
        Err(Error::AlreadyAnalyzed(_))
    ));

    let history = analyses.list_analyses_for_user(user).await?;
    assert_eq!(history.len(), 1);
    assert!(analyses.list_analyses_for_user(Uuid::new_v4()).await?.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_concurrent_upserts_are_atomic() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = Arc::new(PostgresMistakeStatRepository::new(db.pool().clone()));
    let user = Uuid::new_v4();

    let mut handles = Vec::new();
    for i in 0..20 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.record_occurrence(user, &pattern("Vokalharmonie", &format!("örnek {i}")), Utc::now())
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked")?;
    }

    let stat = repo.get_by_pattern(user, "Vokalharmonie").await?.expect("stat");
    assert_eq!(stat.occurrences, 20);
    assert_eq!(repo.list_top_for_user(user, 10).await?.len(), 1);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_mastery_update_is_scoped_to_owner() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresMistakeStatRepository::new(db.pool().clone());
    let user = Uuid::new_v4();

    let stat = repo.record_occurrence(user, &pattern("Wortstellung", "a"), Utc::now()).await?;
    let level = MasteryLevel::try_from(4)?;

    assert!(repo.set_mastery_level(Uuid::new_v4(), stat.mistake_id, level).await?.is_none());
    let updated = repo
        .set_mastery_level(user, stat.mistake_id, level)
        .await?
        .expect("owner can update");
    assert_eq!(updated.mastery_level, level);

    let again = repo.record_occurrence(user, &pattern("Wortstellung", "b"), Utc::now()).await?;
    assert_eq!(again.occurrences, 2);
    assert_eq!(again.mastery_level, level);
    assert_eq!(again.example_wrong, "b");
    Ok(())
}
