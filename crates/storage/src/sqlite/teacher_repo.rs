use pd_core::model::{SchoolId, Teacher, TeacherId, TeacherStatus};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_teacher_row, ser, teacher_id_from_i64};
use crate::repository::{StorageError, TeacherRepository};

/// Teachers of school `?1` holding an onboarding slot, other than teacher `?2`.
const COUNTED_ON_ROSTER: &str = r"
    SELECT COUNT(*) FROM teachers
    WHERE school_id = ?1 AND id <> ?2 AND status <> ?3
";

const SELECT_TEACHER: &str = r"
    SELECT id, school_id, name, email, subject, status, joined_at
    FROM teachers
";

#[async_trait::async_trait]
impl TeacherRepository for SqliteRepository {
    async fn insert_teacher(&self, teacher: &Teacher) -> Result<TeacherId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO teachers (school_id, name, email, subject, status, joined_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_to_i64("school_id", teacher.school_id().value())?)
        .bind(teacher.name())
        .bind(teacher.email())
        .bind(teacher.subject())
        .bind(teacher.status().as_str())
        .bind(teacher.joined_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        teacher_id_from_i64(res.last_insert_rowid())
    }

    async fn insert_teacher_within_limit(
        &self,
        teacher: &Teacher,
        limit: u32,
    ) -> Result<Option<TeacherId>, StorageError> {
        // The count and the insert run as one statement so concurrent invites
        // cannot both take the last slot.
        let res = sqlx::query(&format!(
            r"
            INSERT INTO teachers (school_id, name, email, subject, status, joined_at)
            SELECT ?1, ?4, ?5, ?6, ?7, ?8
            WHERE ({COUNTED_ON_ROSTER}) < ?9
            "
        ))
        .bind(id_to_i64("school_id", teacher.school_id().value())?)
        .bind(0_i64)
        .bind(TeacherStatus::Inactive.as_str())
        .bind(teacher.name())
        .bind(teacher.email())
        .bind(teacher.subject())
        .bind(teacher.status().as_str())
        .bind(teacher.joined_at())
        .bind(i64::from(limit))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        teacher_id_from_i64(res.last_insert_rowid()).map(Some)
    }

    async fn update_teacher_within_limit(
        &self,
        teacher: &Teacher,
        limit: u32,
    ) -> Result<bool, StorageError> {
        let id = id_to_i64("teacher_id", teacher.id().value())?;
        let res = sqlx::query(&format!(
            r"
            UPDATE teachers SET
                name = ?4,
                email = ?5,
                subject = ?6,
                status = ?7
            WHERE id = ?2 AND ({COUNTED_ON_ROSTER}) < ?8
            "
        ))
        .bind(id_to_i64("school_id", teacher.school_id().value())?)
        .bind(id)
        .bind(TeacherStatus::Inactive.as_str())
        .bind(teacher.name())
        .bind(teacher.email())
        .bind(teacher.subject())
        .bind(teacher.status().as_str())
        .bind(i64::from(limit))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() > 0 {
            return Ok(true);
        }
        match self.get_teacher(teacher.id()).await? {
            Some(_) => Ok(false),
            None => Err(StorageError::NotFound),
        }
    }

    async fn update_teacher(&self, teacher: &Teacher) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE teachers SET
                name = ?2,
                email = ?3,
                subject = ?4,
                status = ?5
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("teacher_id", teacher.id().value())?)
        .bind(teacher.name())
        .bind(teacher.email())
        .bind(teacher.subject())
        .bind(teacher.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_TEACHER} WHERE id = ?1"))
            .bind(id_to_i64("teacher_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_teacher_row).transpose()
    }

    async fn list_teachers(&self, school_id: SchoolId) -> Result<Vec<Teacher>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_TEACHER} WHERE school_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64("school_id", school_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_teacher_row).collect()
    }

    async fn count_teachers(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM teachers")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(ser)
    }
}
