use pd_core::model::{School, SchoolId, SchoolStatus};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_school_row, school_id_from_i64};
use crate::repository::{SchoolRepository, StorageError};

const SELECT_SCHOOL: &str = r"
    SELECT id, name, city, contact_email, status, onboarding_limit, rejection_reason, created_at
    FROM schools
";

#[async_trait::async_trait]
impl SchoolRepository for SqliteRepository {
    async fn insert_school(&self, school: &School) -> Result<SchoolId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO schools (name, city, contact_email, status, onboarding_limit, rejection_reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(school.name())
        .bind(school.city())
        .bind(school.contact_email())
        .bind(school.status().as_str())
        .bind(school.onboarding_limit().map(|l| i64::from(l.value())))
        .bind(school.rejection_reason())
        .bind(school.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        school_id_from_i64(res.last_insert_rowid())
    }

    async fn update_school(&self, school: &School) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE schools SET
                name = ?2,
                city = ?3,
                contact_email = ?4,
                status = ?5,
                onboarding_limit = ?6,
                rejection_reason = ?7
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("school_id", school.id().value())?)
        .bind(school.name())
        .bind(school.city())
        .bind(school.contact_email())
        .bind(school.status().as_str())
        .bind(school.onboarding_limit().map(|l| i64::from(l.value())))
        .bind(school.rejection_reason())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn update_school_if_status(
        &self,
        school: &School,
        expected: SchoolStatus,
    ) -> Result<bool, StorageError> {
        let id = id_to_i64("school_id", school.id().value())?;
        let res = sqlx::query(
            r"
            UPDATE schools SET
                status = ?2,
                onboarding_limit = ?3,
                rejection_reason = ?4
            WHERE id = ?1 AND status = ?5
            ",
        )
        .bind(id)
        .bind(school.status().as_str())
        .bind(school.onboarding_limit().map(|l| i64::from(l.value())))
        .bind(school.rejection_reason())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() > 0 {
            return Ok(true);
        }
        match self.get_school(school.id()).await? {
            Some(_) => Ok(false),
            None => Err(StorageError::NotFound),
        }
    }

    async fn get_school(&self, id: SchoolId) -> Result<Option<School>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_SCHOOL} WHERE id = ?1"))
            .bind(id_to_i64("school_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_school_row).transpose()
    }

    async fn list_schools(&self) -> Result<Vec<School>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_SCHOOL} ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_school_row).collect()
    }
}
