use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::analysis::Category;

/// User-set self assessment for a mistake pattern, 0 (not yet) to 5 (mastered).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for MasteryLevel {
    type Error = Error;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        if (0..=Self::MAX as i32).contains(&level) {
            Ok(MasteryLevel(level as u8))
        } else {
            Err(Error::InvalidRequest(format!(
                "mastery level must be between 0 and {}, got {}",
                Self::MAX,
                level
            )))
        }
    }
}

impl From<MasteryLevel> for i32 {
    fn from(level: MasteryLevel) -> Self {
        level.0 as i32
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Running aggregate for one `(user, pattern description)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeStat {
    pub mistake_id: Uuid,
    pub user_id: Uuid,
    pub pattern: String,
    pub category: Category,
    pub example_wrong: String,
    pub example_correct: String,
    pub occurrences: i32,
    pub mastery_level: MasteryLevel,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
