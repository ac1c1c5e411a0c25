use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS schools (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        city TEXT NOT NULL,
        contact_email TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
        onboarding_limit INTEGER CHECK (onboarding_limit IS NULL OR onboarding_limit > 0),
        rejection_reason TEXT,
        created_at TEXT NOT NULL
    );
    ",
    r"
    CREATE TABLE IF NOT EXISTS teachers (
        id INTEGER PRIMARY KEY,
        school_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        subject TEXT,
        status TEXT NOT NULL CHECK (status IN ('invited', 'active', 'inactive')),
        joined_at TEXT NOT NULL,
        UNIQUE (school_id, email),
        FOREIGN KEY (school_id) REFERENCES schools(id) ON DELETE CASCADE
    );
    ",
    r"
    CREATE TABLE IF NOT EXISTS pd_modules (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        competency TEXT NOT NULL,
        difficulty TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
        status TEXT NOT NULL CHECK (status IN ('draft', 'published', 'archived')),
        materials_json TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    ",
    r"
    CREATE TABLE IF NOT EXISTS pd_assignments (
        id INTEGER PRIMARY KEY,
        module_id INTEGER NOT NULL,
        teacher_id INTEGER NOT NULL,
        assigned_at TEXT NOT NULL,
        due_at TEXT,
        status TEXT NOT NULL CHECK (status IN ('assigned', 'in_progress', 'completed')),
        completed_at TEXT,
        FOREIGN KEY (module_id) REFERENCES pd_modules(id) ON DELETE CASCADE,
        FOREIGN KEY (teacher_id) REFERENCES teachers(id) ON DELETE CASCADE
    );
    ",
    r"
    CREATE TABLE IF NOT EXISTS question_bank (
        position INTEGER PRIMARY KEY,
        id TEXT NOT NULL,
        type TEXT NOT NULL,
        prompt TEXT NOT NULL,
        options_json TEXT
    );
    ",
    r"
    CREATE TABLE IF NOT EXISTS competency_attempts (
        id TEXT PRIMARY KEY,
        teacher_id INTEGER NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('NOT_STARTED', 'IN_PROGRESS', 'EVALUATED')),
        questions_json TEXT NOT NULL,
        answers_json TEXT NOT NULL,
        started_at TEXT NOT NULL,
        evaluated_at TEXT
    );
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_teachers_school
        ON teachers(school_id, id);
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_assignments_teacher
        ON pd_assignments(teacher_id, id);
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_assignments_module
        ON pd_assignments(module_id, id);
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_attempts_teacher_started
        ON competency_attempts(teacher_id, started_at);
    ",
];

/// Runs the versioned migrations for the dashboard schema.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: schools, rosters, PD catalog, assignments, assessment.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
