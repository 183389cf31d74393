// src/repositories/postgres/mistake_stats.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use kalem_common::models::{Category, MasteryLevel, MistakePattern, MistakeStat};
use kalem_common::traits::repository_traits::MistakeStatRepository;

use crate::Error;

const STAT_COLUMNS: &str = "mistake_id, user_id, pattern, category, example_wrong, example_correct, \
                            occurrences, mastery_level, last_seen, created_at";

#[derive(Clone)]
pub struct PostgresMistakeStatRepository {
    pool: Pool<Postgres>,
}

impl PostgresMistakeStatRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_stat(row: &PgRow) -> Result<MistakeStat, Error> {
    let category: String = row.try_get("category")?;
    let mastery: i16 = row.try_get("mastery_level")?;

    Ok(MistakeStat {
        mistake_id: row.try_get("mistake_id")?,
        user_id: row.try_get("user_id")?,
        pattern: row.try_get("pattern")?,
        category: Category::from(category),
        example_wrong: row.try_get("example_wrong")?,
        example_correct: row.try_get("example_correct")?,
        occurrences: row.try_get("occurrences")?,
        mastery_level: MasteryLevel::try_from(mastery as i32)?,
        last_seen: row.try_get("last_seen")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MistakeStatRepository for PostgresMistakeStatRepository {
    async fn record_occurrence(
        &self,
        user_id: Uuid,
        pattern: &MistakePattern,
        seen_at: DateTime<Utc>,
    ) -> Result<MistakeStat, Error> {
        // Postgres "ON CONFLICT" upsert: the increment happens inside the
        // statement, so concurrent writers cannot lose updates or duplicate rows.
        let sql = format!(
            r#"
            INSERT INTO mistake_stats (
                mistake_id, user_id, pattern, category,
                example_wrong, example_correct,
                occurrences, mastery_level, last_seen, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 1, 0, $7, $7)
            ON CONFLICT (user_id, pattern) DO UPDATE
              SET occurrences = mistake_stats.occurrences + 1,
                  example_wrong = EXCLUDED.example_wrong,
                  example_correct = EXCLUDED.example_correct,
                  last_seen = EXCLUDED.last_seen
            RETURNING {STAT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&pattern.description)
            .bind(pattern.category.as_str())
            .bind(&pattern.example_wrong)
            .bind(&pattern.example_correct)
            .bind(seen_at)
            .fetch_one(&self.pool)
            .await?;

        row_to_stat(&row)
    }

    async fn get_by_pattern(&self, user_id: Uuid, pattern: &str) -> Result<Option<MistakeStat>, Error> {
        let sql = format!(
            "SELECT {STAT_COLUMNS} FROM mistake_stats WHERE user_id = $1 AND pattern = $2"
        );

        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(pattern)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_stat).transpose()
    }

    async fn list_top_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<MistakeStat>, Error> {
        let sql = format!(
            r#"
            SELECT {STAT_COLUMNS}
            FROM mistake_stats
            WHERE user_id = $1
            ORDER BY occurrences DESC, last_seen DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_stat).collect()
    }

    async fn set_mastery_level(
        &self,
        user_id: Uuid,
        mistake_id: Uuid,
        level: MasteryLevel,
    ) -> Result<Option<MistakeStat>, Error> {
        let sql = format!(
            r#"
            UPDATE mistake_stats
               SET mastery_level = $3
             WHERE mistake_id = $1 AND user_id = $2
            RETURNING {STAT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(mistake_id)
            .bind(user_id)
            .bind(i32::from(level) as i16)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_stat).transpose()
    }
}
