//! Demo data for local development.

use chrono::{DateTime, Duration, Utc};
use pd_core::model::{
    AssignmentId, Difficulty, Material, MaterialKind, ModuleDraft, ModuleId, OnboardingLimit,
    PdAssignment, PdModule, RawQuestion, School, SchoolDraft, SchoolId, Teacher, TeacherDraft,
    TeacherId,
};
use thiserror::Error;

use crate::repository::{Storage, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid seed data: {0}")]
    Invalid(String),
}

fn invalid<E: std::fmt::Display>(e: E) -> SeedError {
    SeedError::Invalid(e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub schools: usize,
    pub teachers: usize,
    pub modules: usize,
    pub assignments: usize,
    pub questions: usize,
}

fn school_draft(name: &str, city: &str, email: &str) -> SchoolDraft {
    SchoolDraft {
        name: name.into(),
        city: city.into(),
        contact_email: email.into(),
    }
}

fn mcq(id: &str, prompt: &str, options: &[&str]) -> RawQuestion {
    RawQuestion::new(
        id,
        "MCQ",
        prompt,
        Some(options.iter().map(|o| (*o).to_owned()).collect()),
    )
}

/// The competency question bank shipped with the demo database.
#[must_use]
pub fn demo_questions() -> Vec<RawQuestion> {
    vec![
        mcq(
            "mcq-1",
            "Which strategy best checks understanding mid-lesson?",
            &["Exit ticket", "Cold calling one student", "Assigning homework", "Reading aloud"],
        ),
        mcq(
            "mcq-2",
            "A student repeatedly disrupts group work. What is the first step?",
            &["Remove them from class", "Private conversation", "Ignore it", "Call parents"],
        ),
        mcq(
            "mcq-3",
            "Which is an example of differentiated instruction?",
            &["Same worksheet for all", "Tiered tasks", "Longer lectures", "Fewer breaks"],
        ),
        RawQuestion::new(
            "sa-1",
            "SHORT_ANSWER",
            "Describe how you plan a lesson for mixed-ability learners.",
            None,
        ),
        RawQuestion::new(
            "sa-2",
            "SHORT_ANSWER",
            "How do you use assessment data to adjust your teaching?",
            None,
        ),
        RawQuestion::new(
            "audio-1",
            "UPLOAD_AUDIO",
            "Record a two-minute explanation of a concept you teach.",
            None,
        ),
        RawQuestion::new(
            "video-1",
            "VIDEO",
            "Upload a short clip of you opening a lesson.",
            None,
        ),
        RawQuestion::new(
            "essay-1",
            "ESSAY",
            "Legacy essay prompt kept for reporting.",
            None,
        ),
    ]
}

/// Populates `storage` with schools, rosters, PD modules, assignments, and the
/// competency question bank.
///
/// # Errors
///
/// Returns `SeedError` if any record cannot be built or stored.
pub async fn seed_demo(storage: &Storage, now: DateTime<Utc>) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let mut approved = School::register(
        SchoolId::new(0),
        school_draft("Riverside High School", "Pune", "admin@riverside.edu"),
        now - Duration::days(30),
    )
    .map_err(invalid)?;
    approved
        .approve(OnboardingLimit::new(5).map_err(invalid)?)
        .map_err(invalid)?;
    let approved_id = storage.schools.insert_school(&approved).await?;

    let pending = School::register(
        SchoolId::new(0),
        school_draft("Hillview Academy", "Nashik", "office@hillview.org"),
        now - Duration::days(2),
    )
    .map_err(invalid)?;
    storage.schools.insert_school(&pending).await?;

    let mut rejected = School::register(
        SchoolId::new(0),
        school_draft("Sunrise Tutorials", "Mumbai", "hello@sunrise.in"),
        now - Duration::days(10),
    )
    .map_err(invalid)?;
    rejected
        .reject("Not a registered K-12 institution")
        .map_err(invalid)?;
    storage.schools.insert_school(&rejected).await?;
    report.schools = 3;

    let roster = [
        ("Asha Rao", "asha.rao@riverside.edu", "Mathematics", true),
        ("Vikram Shah", "vikram.shah@riverside.edu", "Science", true),
        ("Meera Iyer", "meera.iyer@riverside.edu", "English", false),
    ];
    let mut teacher_ids: Vec<TeacherId> = Vec::new();
    for (name, email, subject, active) in roster {
        let mut teacher = Teacher::invite(
            TeacherId::new(0),
            approved_id,
            TeacherDraft {
                name: name.into(),
                email: email.into(),
                subject: Some(subject.into()),
            },
            now - Duration::days(20),
        )
        .map_err(invalid)?;
        if active {
            teacher.activate().map_err(invalid)?;
        }
        teacher_ids.push(storage.teachers.insert_teacher(&teacher).await?);
    }
    report.teachers = teacher_ids.len();

    let mut published = PdModule::new(
        ModuleId::new(0),
        ModuleDraft {
            title: "Formative Assessment in Practice".into(),
            description: "Quick checks for understanding that fit into any lesson.".into(),
            competency: "Assessment".into(),
            difficulty: Difficulty::Beginner,
            duration_minutes: 45,
        },
        now - Duration::days(15),
    )
    .map_err(invalid)?;
    published
        .add_material(
            Material::new(
                "Exit tickets walkthrough",
                MaterialKind::Video,
                "https://media.example.org/pd/exit-tickets.mp4",
            )
            .map_err(invalid)?,
        )
        .map_err(invalid)?;
    published
        .add_material(
            Material::new(
                "Question stems handout",
                MaterialKind::Document,
                "https://media.example.org/pd/question-stems.pdf",
            )
            .map_err(invalid)?,
        )
        .map_err(invalid)?;
    published.publish().map_err(invalid)?;
    let published_id = storage.modules.insert_module(&published).await?;

    let draft = PdModule::new(
        ModuleId::new(0),
        ModuleDraft {
            title: "Restorative Classroom Conversations".into(),
            description: "Structured dialogue after behavior incidents.".into(),
            competency: "Classroom Management".into(),
            difficulty: Difficulty::Intermediate,
            duration_minutes: 60,
        },
        now - Duration::days(3),
    )
    .map_err(invalid)?;
    storage.modules.insert_module(&draft).await?;
    report.modules = 2;

    for teacher_id in teacher_ids.iter().take(2) {
        let assignment = PdAssignment::new(
            AssignmentId::new(0),
            published_id,
            *teacher_id,
            now - Duration::days(7),
            Some(now + Duration::days(7)),
        )
        .map_err(invalid)?;
        storage.assignments.insert_assignment(&assignment).await?;
        report.assignments += 1;
    }

    let questions = demo_questions();
    storage.questions.replace_questions(&questions).await?;
    report.questions = questions.len();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::time::fixed_now;

    #[tokio::test]
    async fn seeds_in_memory_storage() {
        let storage = Storage::in_memory();
        let report = seed_demo(&storage, fixed_now()).await.unwrap();

        assert_eq!(report.schools, 3);
        assert_eq!(storage.schools.list_schools().await.unwrap().len(), 3);
        assert_eq!(storage.teachers.count_teachers().await.unwrap(), 3);
        assert_eq!(
            storage.questions.list_questions().await.unwrap().len(),
            report.questions
        );
    }
}
