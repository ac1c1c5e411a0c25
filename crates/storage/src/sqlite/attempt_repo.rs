use pd_core::model::{Attempt, AttemptId, RawQuestion, TeacherId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, from_json, id_to_i64, map_attempt_row, ser, to_json};
use crate::repository::{AttemptRepository, QuestionBankRepository, StorageError};

const SELECT_ATTEMPT: &str = r"
    SELECT id, teacher_id, status, questions_json, answers_json, started_at, evaluated_at
    FROM competency_attempts
";

#[async_trait::async_trait]
impl QuestionBankRepository for SqliteRepository {
    async fn replace_questions(&self, questions: &[RawQuestion]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM question_bank")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, question) in questions.iter().enumerate() {
            let options = question.options.as_ref().map(to_json).transpose()?;
            sqlx::query(
                r"
                INSERT INTO question_bank (position, id, type, prompt, options_json)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(i64::try_from(position).map_err(ser)?)
            .bind(&question.id)
            .bind(&question.type_tag)
            .bind(&question.prompt)
            .bind(options)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)
    }

    async fn list_questions(&self) -> Result<Vec<RawQuestion>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, type, prompt, options_json
            FROM question_bank
            ORDER BY position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let options = row
                    .try_get::<Option<String>, _>("options_json")
                    .map_err(ser)?
                    .map(|raw| from_json::<Vec<String>>(&raw))
                    .transpose()?;
                Ok(RawQuestion {
                    id: row.try_get("id").map_err(ser)?,
                    type_tag: row.try_get("type").map_err(ser)?,
                    prompt: row.try_get("prompt").map_err(ser)?,
                    options,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn upsert_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO competency_attempts (id, teacher_id, status, questions_json, answers_json, started_at, evaluated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                questions_json = excluded.questions_json,
                answers_json = excluded.answers_json,
                evaluated_at = excluded.evaluated_at
            ",
        )
        .bind(attempt.id().value().to_string())
        .bind(id_to_i64("teacher_id", attempt.teacher_id().value())?)
        .bind(attempt.status().as_str())
        .bind(to_json(attempt.questions())?)
        .bind(to_json(attempt.answers())?)
        .bind(attempt.started_at())
        .bind(attempt.evaluated_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<Attempt>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_ATTEMPT} WHERE id = ?1"))
            .bind(id.value().to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_attempt_row).transpose()
    }

    async fn latest_attempt_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, StorageError> {
        let row = sqlx::query(&format!(
            "{SELECT_ATTEMPT} WHERE teacher_id = ?1 ORDER BY started_at DESC LIMIT 1"
        ))
        .bind(id_to_i64("teacher_id", teacher_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_attempt_row).transpose()
    }
}
