// File: kalem-core/tests/mistake_tests.rs

use std::sync::Arc;

use uuid::Uuid;

use kalem_common::models::{Category, MistakePattern};
use kalem_core::Error;
use kalem_core::services::MistakeTracker;
use kalem_core::test_utils::InMemoryMistakeStatRepository;

fn pattern(description: &str, category: Category, wrong: &str, correct: &str) -> MistakePattern {
    MistakePattern {
        description: description.to_string(),
        category,
        example_wrong: wrong.to_string(),
        example_correct: correct.to_string(),
    }
}

fn grammar(description: &str) -> MistakePattern {
    pattern(description, Category::Grammar, "yanlış", "doğru")
}

fn tracker() -> (MistakeTracker, Arc<InMemoryMistakeStatRepository>) {
    let repo = Arc::new(InMemoryMistakeStatRepository::new());
    (MistakeTracker::new(repo.clone()), repo)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_records_lose_no_updates() -> Result<(), Error> {
    let (tracker, repo) = tracker();
    let user = Uuid::new_v4();
    let p = grammar("Akkusativ-Endung fehlt");

    let mut handles = Vec::new();
    for _ in 0..64 {
        let tracker = tracker.clone();
        let p = p.clone();
        handles.push(tokio::spawn(async move { tracker.record(user, &p).await }));
    }
    for handle in handles {
        handle.await.expect("task panicked")?;
    }

    let stat = tracker.get(user, &p.description).await?.expect("stat exists");
    assert_eq!(stat.occurrences, 64);
    assert_eq!(repo.len(), 1);
    Ok(())
}

#[tokio::test]
async fn same_pattern_for_different_users_stays_separate() -> Result<(), Error> {
    let (tracker, repo) = tracker();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let p = grammar("Vokalharmonie");

    tracker.record(alice, &p).await?;
    tracker.record(alice, &p).await?;
    tracker.record(bob, &p).await?;

    assert_eq!(repo.len(), 2);
    assert_eq!(tracker.get(alice, "Vokalharmonie").await?.map(|s| s.occurrences), Some(2));
    assert_eq!(tracker.get(bob, "Vokalharmonie").await?.map(|s| s.occurrences), Some(1));
    Ok(())
}

#[tokio::test]
async fn later_occurrences_keep_first_category_and_replace_examples() -> Result<(), Error> {
    let (tracker, _) = tracker();
    let user = Uuid::new_v4();

    let first = tracker
        .record(user, &pattern("-de/-da", Category::Grammar, "evda", "evde"))
        .await?;
    let second = tracker
        .record(user, &pattern("-de/-da", Category::Vocabulary, "okulde", "okulda"))
        .await?;

    assert_eq!(second.mistake_id, first.mistake_id);
    assert_eq!(second.category, Category::Grammar);
    assert_eq!(second.example_wrong, "okulde");
    assert_eq!(second.example_correct, "okulda");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.last_seen >= first.last_seen);
    Ok(())
}

#[tokio::test]
async fn mastery_survives_new_occurrences() -> Result<(), Error> {
    let (tracker, _) = tracker();
    let user = Uuid::new_v4();
    let p = grammar("Vokalharmonie");

    let stat = tracker.record(user, &p).await?;
    let updated = tracker.set_mastery(user, stat.mistake_id, 3).await?;
    assert_eq!(updated.mastery_level.value(), 3);
    assert_eq!(updated.occurrences, 1);

    let again = tracker.record(user, &p).await?;
    assert_eq!(again.occurrences, 2);
    assert_eq!(again.mastery_level.value(), 3);
    Ok(())
}

#[tokio::test]
async fn mastery_outside_range_is_rejected() -> Result<(), Error> {
    let (tracker, _) = tracker();
    let user = Uuid::new_v4();
    let stat = tracker.record(user, &grammar("Vokalharmonie")).await?;

    for level in [-1, 6, 100] {
        let result = tracker.set_mastery(user, stat.mistake_id, level).await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))), "level {level}");
    }
    let top = tracker.set_mastery(user, stat.mistake_id, 5).await?;
    assert_eq!(top.mastery_level.value(), 5);
    let bottom = tracker.set_mastery(user, stat.mistake_id, 0).await?;
    assert_eq!(bottom.mastery_level.value(), 0);
    Ok(())
}

#[tokio::test]
async fn mastery_of_someone_elses_stat_is_not_found() -> Result<(), Error> {
    let (tracker, _) = tracker();
    let owner = Uuid::new_v4();
    let stat = tracker.record(owner, &grammar("Vokalharmonie")).await?;

    let other = tracker.set_mastery(Uuid::new_v4(), stat.mistake_id, 4).await;
    assert!(matches!(other, Err(Error::NotFound(_))));

    let unknown = tracker.set_mastery(owner, Uuid::new_v4(), 4).await;
    assert!(matches!(unknown, Err(Error::NotFound(_))));

    let unchanged = tracker.get(owner, "Vokalharmonie").await?.expect("stat");
    assert_eq!(unchanged.mastery_level.value(), 0);
    Ok(())
}

#[tokio::test]
async fn top_mistakes_are_ordered_by_count() -> Result<(), Error> {
    let (tracker, _) = tracker();
    let user = Uuid::new_v4();

    for description in ["a", "a", "a", "b", "c", "c"] {
        tracker.record(user, &grammar(description)).await?;
    }
    tracker.record(Uuid::new_v4(), &grammar("z")).await?;

    let top = tracker.top_mistakes(user, MistakeTracker::DEFAULT_TOP_LIMIT).await?;
    let order: Vec<&str> = top.iter().map(|s| s.pattern.as_str()).collect();
    assert_eq!(order, vec!["a", "c", "b"]);

    let two = tracker.top_mistakes(user, 2).await?;
    assert_eq!(two.len(), 2);

    assert!(matches!(tracker.top_mistakes(user, 0).await, Err(Error::InvalidRequest(_))));
    Ok(())
}
