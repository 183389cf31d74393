// src/repositories/postgres/analysis.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use kalem_common::models::{AnalysisRecord, Correction, SuggestedIdiom, Variants};
use kalem_common::traits::repository_traits::AnalysisRepository;

use crate::Error;

/// Postgres error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PostgresAnalysisRepository {
    pool: Pool<Postgres>,
}

impl PostgresAnalysisRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &PgRow) -> Result<AnalysisRecord, Error> {
    let corrections: Json<Vec<Correction>> = row.try_get("corrections")?;
    let suggested_idioms: Json<Vec<SuggestedIdiom>> = row.try_get("suggested_idioms")?;

    Ok(AnalysisRecord {
        analysis_id: row.try_get("analysis_id")?,
        exercise_id: row.try_get("exercise_id")?,
        corrections: corrections.0,
        variants: Variants {
            business_formal: row.try_get("variant_formal")?,
            colloquial_smart: row.try_get("variant_colloquial")?,
            c1_sophisticated: row.try_get("variant_sophisticated")?,
        },
        suggested_idioms: suggested_idioms.0,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl AnalysisRepository for PostgresAnalysisRepository {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO analyses (
                analysis_id, exercise_id, corrections,
                variant_formal, variant_colloquial, variant_sophisticated,
                suggested_idioms, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
            .bind(record.analysis_id)
            .bind(record.exercise_id)
            .bind(Json(&record.corrections))
            .bind(&record.variants.business_formal)
            .bind(&record.variants.colloquial_smart)
            .bind(&record.variants.c1_sophisticated)
            .bind(Json(&record.suggested_idioms))
            .bind(record.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let duplicate = e
                    .as_database_error()
                    .and_then(|db_err| db_err.code())
                    .is_some_and(|code| code == UNIQUE_VIOLATION);
                if duplicate {
                    Err(Error::AlreadyAnalyzed(record.exercise_id))
                } else {
                    Err(Error::Database(e))
                }
            }
        }
    }

    async fn get_analysis_for_exercise(&self, exercise_id: Uuid) -> Result<Option<AnalysisRecord>, Error> {
        let row = sqlx::query(
            r#"
            SELECT analysis_id, exercise_id, corrections,
                   variant_formal, variant_colloquial, variant_sophisticated,
                   suggested_idioms, created_at
            FROM analyses
            WHERE exercise_id = $1
            "#,
        )
            .bind(exercise_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn list_analyses_for_user(&self, user_id: Uuid) -> Result<Vec<AnalysisRecord>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT a.analysis_id, a.exercise_id, a.corrections,
                   a.variant_formal, a.variant_colloquial, a.variant_sophisticated,
                   a.suggested_idioms, a.created_at
            FROM analyses a
            INNER JOIN exercises e ON e.exercise_id = a.exercise_id
            WHERE e.user_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }
}
