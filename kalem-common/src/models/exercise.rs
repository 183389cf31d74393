use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One writing submission. Never modified after it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub exercise_id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub user_text: String,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(user_id: Uuid, prompt: impl Into<String>, user_text: impl Into<String>) -> Self {
        let user_text = user_text.into();
        Self {
            exercise_id: Uuid::new_v4(),
            user_id,
            prompt: prompt.into(),
            word_count: count_words(&user_text),
            user_text,
            created_at: Utc::now(),
        }
    }
}

/// Whitespace-separated, non-empty tokens.
pub fn count_words(text: &str) -> i32 {
    text.split_whitespace().count() as i32
}
