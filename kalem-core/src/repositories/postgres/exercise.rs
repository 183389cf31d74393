use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use kalem_common::models::Exercise;
use kalem_common::traits::repository_traits::ExerciseRepository;

use crate::Error;

#[derive(Clone)]
pub struct PostgresExerciseRepository {
    pool: Pool<Postgres>,
}

impl PostgresExerciseRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExerciseRepository for PostgresExerciseRepository {
    async fn create_exercise(&self, exercise: &Exercise) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO exercises (
                exercise_id, user_id, prompt, user_text, word_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
            .bind(exercise.exercise_id)
            .bind(exercise.user_id)
            .bind(&exercise.prompt)
            .bind(&exercise.user_text)
            .bind(exercise.word_count)
            .bind(exercise.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_exercise(&self, exercise_id: Uuid) -> Result<Option<Exercise>, Error> {
        let exercise = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT exercise_id, user_id, prompt, user_text, word_count, created_at
            FROM exercises
            WHERE exercise_id = $1
            "#,
        )
            .bind(exercise_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(exercise)
    }

    async fn list_exercises_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Exercise>, Error> {
        let exercises = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT exercise_id, user_id, prompt, user_text, word_count, created_at
            FROM exercises
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(exercises)
    }
}
