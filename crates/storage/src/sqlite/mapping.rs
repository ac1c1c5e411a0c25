use chrono::{DateTime, Utc};
use pd_core::model::{
    Answer, AssignmentId, AssignmentStatus, Attempt, AttemptId, AttemptStatus, Difficulty,
    Material, ModuleDraft, ModuleId, ModuleStatus, PdAssignment, PdModule, QuestionCatalog,
    School, SchoolId, SchoolStatus, Teacher, TeacherDraft, TeacherId, TeacherStatus,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

fn parse_enum<T>(
    field: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, StorageError> {
    parse(raw).ok_or_else(|| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

pub(crate) fn school_id_from_i64(v: i64) -> Result<SchoolId, StorageError> {
    Ok(SchoolId::new(i64_to_u64("school_id", v)?))
}

pub(crate) fn teacher_id_from_i64(v: i64) -> Result<TeacherId, StorageError> {
    Ok(TeacherId::new(i64_to_u64("teacher_id", v)?))
}

pub(crate) fn module_id_from_i64(v: i64) -> Result<ModuleId, StorageError> {
    Ok(ModuleId::new(i64_to_u64("module_id", v)?))
}

pub(crate) fn assignment_id_from_i64(v: i64) -> Result<AssignmentId, StorageError> {
    Ok(AssignmentId::new(i64_to_u64("assignment_id", v)?))
}

pub(crate) fn map_school_row(row: &SqliteRow) -> Result<School, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    let limit = row
        .try_get::<Option<i64>, _>("onboarding_limit")
        .map_err(ser)?
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| StorageError::Serialization(format!("invalid onboarding_limit: {v}")))
        })
        .transpose()?;

    School::from_persisted(
        school_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get("name").map_err(ser)?,
        row.try_get("city").map_err(ser)?,
        row.try_get("contact_email").map_err(ser)?,
        parse_enum("school status", &status, SchoolStatus::parse)?,
        limit,
        row.try_get("rejection_reason").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_teacher_row(row: &SqliteRow) -> Result<Teacher, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    Teacher::from_persisted(
        teacher_id_from_i64(row.try_get("id").map_err(ser)?)?,
        school_id_from_i64(row.try_get("school_id").map_err(ser)?)?,
        TeacherDraft {
            name: row.try_get("name").map_err(ser)?,
            email: row.try_get("email").map_err(ser)?,
            subject: row.try_get("subject").map_err(ser)?,
        },
        parse_enum("teacher status", &status, TeacherStatus::parse)?,
        row.try_get("joined_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_module_row(row: &SqliteRow) -> Result<PdModule, StorageError> {
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    let status: String = row.try_get("status").map_err(ser)?;
    let duration: i64 = row.try_get("duration_minutes").map_err(ser)?;
    let materials_json: String = row.try_get("materials_json").map_err(ser)?;
    let materials: Vec<Material> = from_json(&materials_json)?;

    PdModule::from_persisted(
        module_id_from_i64(row.try_get("id").map_err(ser)?)?,
        ModuleDraft {
            title: row.try_get("title").map_err(ser)?,
            description: row.try_get("description").map_err(ser)?,
            competency: row.try_get("competency").map_err(ser)?,
            difficulty: parse_enum("difficulty", &difficulty, Difficulty::parse)?,
            duration_minutes: u32::try_from(duration).map_err(|_| {
                StorageError::Serialization(format!("invalid duration_minutes: {duration}"))
            })?,
        },
        parse_enum("module status", &status, ModuleStatus::parse)?,
        materials,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_assignment_row(row: &SqliteRow) -> Result<PdAssignment, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    PdAssignment::from_persisted(
        assignment_id_from_i64(row.try_get("id").map_err(ser)?)?,
        module_id_from_i64(row.try_get("module_id").map_err(ser)?)?,
        teacher_id_from_i64(row.try_get("teacher_id").map_err(ser)?)?,
        row.try_get("assigned_at").map_err(ser)?,
        row.try_get("due_at").map_err(ser)?,
        parse_enum("assignment status", &status, AssignmentStatus::parse)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<Attempt, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id = Uuid::parse_str(&id).map_err(ser)?;
    let status: String = row.try_get("status").map_err(ser)?;
    let questions_json: String = row.try_get("questions_json").map_err(ser)?;
    let answers_json: String = row.try_get("answers_json").map_err(ser)?;
    let questions: QuestionCatalog = from_json(&questions_json)?;
    let answers: Vec<Answer> = from_json(&answers_json)?;
    let started_at: DateTime<Utc> = row.try_get("started_at").map_err(ser)?;

    Attempt::from_persisted(
        AttemptId::new(id),
        teacher_id_from_i64(row.try_get("teacher_id").map_err(ser)?)?,
        parse_enum("attempt status", &status, AttemptStatus::parse)?,
        questions,
        answers,
        started_at,
        row.try_get("evaluated_at").map_err(ser)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert!(matches!(
            school_id_from_i64(-1),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(teacher_id_from_i64(7).unwrap(), TeacherId::new(7));
    }

    #[test]
    fn unknown_enum_strings_are_serialization_errors() {
        let err = parse_enum("school status", "archived", SchoolStatus::parse).unwrap_err();
        assert_eq!(
            err,
            StorageError::Serialization("invalid school status: archived".into())
        );
    }
}
