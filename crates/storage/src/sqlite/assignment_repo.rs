use pd_core::model::{AssignmentId, ModuleId, PdAssignment, TeacherId};

use super::SqliteRepository;
use super::mapping::{assignment_id_from_i64, conn, id_to_i64, map_assignment_row};
use crate::repository::{AssignmentRepository, StorageError};

const SELECT_ASSIGNMENT: &str = r"
    SELECT id, module_id, teacher_id, assigned_at, due_at, status, completed_at
    FROM pd_assignments
";

#[async_trait::async_trait]
impl AssignmentRepository for SqliteRepository {
    async fn insert_assignment(
        &self,
        assignment: &PdAssignment,
    ) -> Result<AssignmentId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO pd_assignments (module_id, teacher_id, assigned_at, due_at, status, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_to_i64("module_id", assignment.module_id().value())?)
        .bind(id_to_i64("teacher_id", assignment.teacher_id().value())?)
        .bind(assignment.assigned_at())
        .bind(assignment.due_at())
        .bind(assignment.status().as_str())
        .bind(assignment.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        assignment_id_from_i64(res.last_insert_rowid())
    }

    async fn update_assignment(&self, assignment: &PdAssignment) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE pd_assignments SET
                due_at = ?2,
                status = ?3,
                completed_at = ?4
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("assignment_id", assignment.id().value())?)
        .bind(assignment.due_at())
        .bind(assignment.status().as_str())
        .bind(assignment.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<PdAssignment>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_ASSIGNMENT} WHERE id = ?1"))
            .bind(id_to_i64("assignment_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_assignment_row).transpose()
    }

    async fn list_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<PdAssignment>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_ASSIGNMENT} WHERE teacher_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64("teacher_id", teacher_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_assignment_row).collect()
    }

    async fn list_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<PdAssignment>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_ASSIGNMENT} WHERE module_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64("module_id", module_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_assignment_row).collect()
    }
}
