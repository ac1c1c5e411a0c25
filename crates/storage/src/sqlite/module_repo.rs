use pd_core::model::{ModuleId, PdModule};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_module_row, module_id_from_i64, to_json};
use crate::repository::{ModuleRepository, StorageError};

const SELECT_MODULE: &str = r"
    SELECT id, title, description, competency, difficulty, duration_minutes, status, materials_json, created_at
    FROM pd_modules
";

#[async_trait::async_trait]
impl ModuleRepository for SqliteRepository {
    async fn insert_module(&self, module: &PdModule) -> Result<ModuleId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO pd_modules (title, description, competency, difficulty, duration_minutes, status, materials_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(module.title())
        .bind(module.description())
        .bind(module.competency())
        .bind(module.difficulty().as_str())
        .bind(i64::from(module.duration_minutes()))
        .bind(module.status().as_str())
        .bind(to_json(module.materials())?)
        .bind(module.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        module_id_from_i64(res.last_insert_rowid())
    }

    async fn update_module(&self, module: &PdModule) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE pd_modules SET
                title = ?2,
                description = ?3,
                competency = ?4,
                difficulty = ?5,
                duration_minutes = ?6,
                status = ?7,
                materials_json = ?8
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("module_id", module.id().value())?)
        .bind(module.title())
        .bind(module.description())
        .bind(module.competency())
        .bind(module.difficulty().as_str())
        .bind(i64::from(module.duration_minutes()))
        .bind(module.status().as_str())
        .bind(to_json(module.materials())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<PdModule>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_MODULE} WHERE id = ?1"))
            .bind(id_to_i64("module_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_module_row).transpose()
    }

    async fn list_modules(&self) -> Result<Vec<PdModule>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_MODULE} ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_module_row).collect()
    }
}
