// File: kalem-core/tests/library_tests.rs

use uuid::Uuid;

use kalem_ai::StubProvider;
use kalem_core::Error;
use kalem_core::services::exercise_service::MIN_TEXT_CHARS;
use kalem_core::test_utils::TestHarness;
use kalem_core::test_utils::fixtures::{answer_with_idioms, SAMPLE_TEXT};

#[tokio::test]
async fn idioms_are_aggregated_across_analyses() -> Result<(), Error> {
    let replies = [
        answer_with_idioms(&[("göz atmak", "Rapora göz attım."), ("canı çıkmak", "Canım çıktı.")]),
        answer_with_idioms(&[("göz atmak", "Dosyaya göz atar mısın?")]),
    ]
    .map(|answer| answer.to_string());
    let harness = TestHarness::new(StubProvider::with_replies(replies));
    let user = Uuid::new_v4();

    for _ in 0..2 {
        let exercise = harness.exercise_for(user).await?;
        harness
            .analysis_service
            .analyze_submission(exercise.exercise_id, SAMPLE_TEXT, user)
            .await?;
    }

    let (idioms, summary) = harness.idioms.library(user, None).await?;
    assert_eq!(idioms.len(), 2);
    assert_eq!(idioms[0].idiom, "göz atmak");
    assert_eq!(idioms[0].occurrences, 2);
    assert_eq!(idioms[1].occurrences, 1);
    assert_eq!(summary.distinct, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.most_frequent, 2);

    let (others, empty) = harness.idioms.library(Uuid::new_v4(), None).await?;
    assert!(others.is_empty());
    assert_eq!(empty.distinct, 0);
    Ok(())
}

#[tokio::test]
async fn search_filters_entries_but_not_the_summary() -> Result<(), Error> {
    let answer = answer_with_idioms(&[("göz atmak", "a"), ("etekleri zil çalmak", "b")]);
    let harness = TestHarness::new(StubProvider::with_reply(answer.to_string()));
    let user = Uuid::new_v4();
    let exercise = harness.exercise_for(user).await?;
    harness
        .analysis_service
        .analyze_submission(exercise.exercise_id, SAMPLE_TEXT, user)
        .await?;

    let (found, summary) = harness.idioms.library(user, Some("ZIL")).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].idiom, "etekleri zil çalmak");
    assert_eq!(summary.distinct, 2);

    let (by_meaning, _) = harness.idioms.library(user, Some("bedeutung: göz")).await?;
    assert_eq!(by_meaning.len(), 1);

    let (blank, _) = harness.idioms.library(user, Some("   ")).await?;
    assert_eq!(blank.len(), 2);
    Ok(())
}

#[tokio::test]
async fn short_submissions_are_rejected() -> Result<(), Error> {
    let harness = TestHarness::new(StubProvider::with_reply("{}"));
    let user = Uuid::new_v4();

    let padded = format!("   {}   ", "a".repeat(MIN_TEXT_CHARS - 1));
    let result = harness.exercise_service.submit(user, "Prompt", &padded).await;
    assert!(matches!(result, Err(Error::InvalidRequest(_))));
    assert!(harness.exercises.is_empty());

    let exact = "ş".repeat(MIN_TEXT_CHARS);
    harness.exercise_service.submit(user, "Prompt", &exact).await?;
    assert_eq!(harness.exercises.len(), 1);
    Ok(())
}

#[tokio::test]
async fn submissions_are_counted_and_listed_per_user() -> Result<(), Error> {
    let harness = TestHarness::new(StubProvider::with_reply("{}"));
    let user = Uuid::new_v4();

    let exercise = harness.exercise_for(user).await?;
    assert_eq!(exercise.word_count, 12);
    assert_eq!(exercise.user_text, SAMPLE_TEXT);
    harness.exercise_for(user).await?;
    harness.exercise_for(Uuid::new_v4()).await?;

    let mine = harness.exercise_service.list(user, 10).await?;
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|e| e.user_id == user));
    assert!(mine[0].created_at >= mine[1].created_at);

    assert!(matches!(
        harness.exercise_service.list(user, 0).await,
        Err(Error::InvalidRequest(_))
    ));
    Ok(())
}
