use chrono::Duration;
use pd_core::model::{
    Answer, AssignmentId, AssignmentStatus, Attempt, AttemptId, AttemptStatus, Difficulty,
    Material, MaterialKind, ModuleDraft, ModuleId, OnboardingLimit, PdAssignment, PdModule,
    QuestionCatalog, QuestionId, RawQuestion, School, SchoolDraft, SchoolId, SchoolStatus,
    Section, Teacher, TeacherDraft, TeacherId,
};
use pd_core::time::fixed_now;
use storage::repository::{
    AssignmentRepository, AttemptRepository, ModuleRepository, QuestionBankRepository,
    SchoolRepository, StorageError, TeacherRepository,
};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn school() -> School {
    School::register(
        SchoolId::new(0),
        SchoolDraft {
            name: "Lakeside".into(),
            city: "Kampala".into(),
            contact_email: "office@lakeside.ug".into(),
        },
        fixed_now(),
    )
    .unwrap()
}

fn teacher(school_id: SchoolId, email: &str) -> Teacher {
    Teacher::invite(
        TeacherId::new(0),
        school_id,
        TeacherDraft {
            name: "Grace".into(),
            email: email.into(),
            subject: Some("Biology".into()),
        },
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_school_approval_round_trips() {
    let repo = repo("memdb_schools").await;
    let id = repo.insert_school(&school()).await.unwrap();

    let mut stored = repo.get_school(id).await.unwrap().expect("school");
    assert_eq!(stored.status(), SchoolStatus::Pending);

    stored.approve(OnboardingLimit::new(3).unwrap()).unwrap();
    repo.update_school(&stored).await.unwrap();

    let reloaded = repo.get_school(id).await.unwrap().expect("school");
    assert_eq!(reloaded.status(), SchoolStatus::Approved);
    assert_eq!(reloaded.onboarding_limit().map(OnboardingLimit::value), Some(3));
    assert!(repo.get_school(SchoolId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_decision_only_lands_on_a_pending_school() {
    let repo = repo("memdb_school_decision").await;
    let id = repo.insert_school(&school()).await.unwrap();

    let pending = repo.get_school(id).await.unwrap().expect("school");
    let mut approved = pending.clone();
    approved.approve(OnboardingLimit::new(3).unwrap()).unwrap();
    let mut rejected = pending;
    rejected.reject("Duplicate registration").unwrap();

    assert!(
        repo.update_school_if_status(&approved, SchoolStatus::Pending)
            .await
            .unwrap()
    );
    assert!(
        !repo
            .update_school_if_status(&rejected, SchoolStatus::Pending)
            .await
            .unwrap()
    );
    let stored = repo.get_school(id).await.unwrap().expect("school");
    assert_eq!(stored.status(), SchoolStatus::Approved);
    assert_eq!(stored.rejection_reason(), None);
}

#[tokio::test]
async fn sqlite_capped_insert_stops_at_the_limit() {
    let repo = repo("memdb_teacher_cap").await;
    let school_id = repo.insert_school(&school()).await.unwrap();

    let first = repo
        .insert_teacher_within_limit(&teacher(school_id, "grace@lakeside.ug"), 1)
        .await
        .unwrap();
    assert!(first.is_some());
    let full = repo
        .insert_teacher_within_limit(&teacher(school_id, "joel@lakeside.ug"), 1)
        .await
        .unwrap();
    assert_eq!(full, None);
    assert_eq!(repo.list_teachers(school_id).await.unwrap().len(), 1);

    let err = repo
        .insert_teacher_within_limit(&teacher(school_id, "grace@lakeside.ug"), 5)
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::Conflict);
}

#[tokio::test]
async fn sqlite_teacher_email_is_unique_per_school() {
    let repo = repo("memdb_teachers").await;
    let school_id = repo.insert_school(&school()).await.unwrap();

    repo.insert_teacher(&teacher(school_id, "grace@lakeside.ug"))
        .await
        .unwrap();
    let err = repo
        .insert_teacher(&teacher(school_id, "grace@lakeside.ug"))
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::Conflict);

    let roster = repo.list_teachers(school_id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].subject(), Some("Biology"));
    assert_eq!(repo.count_teachers().await.unwrap(), 1);
}

#[tokio::test]
async fn sqlite_module_materials_and_assignments_persist() {
    let repo = repo("memdb_modules").await;
    let school_id = repo.insert_school(&school()).await.unwrap();
    let teacher_id = repo
        .insert_teacher(&teacher(school_id, "grace@lakeside.ug"))
        .await
        .unwrap();

    let mut module = PdModule::new(
        ModuleId::new(0),
        ModuleDraft {
            title: "Inquiry Labs".into(),
            description: String::new(),
            competency: "Pedagogy".into(),
            difficulty: Difficulty::Advanced,
            duration_minutes: 90,
        },
        fixed_now(),
    )
    .unwrap();
    module
        .add_material(
            Material::new("Lab guide", MaterialKind::Document, "https://example.org/lab.pdf")
                .unwrap(),
        )
        .unwrap();
    module.publish().unwrap();
    let module_id = repo.insert_module(&module).await.unwrap();

    let fetched = repo.get_module(module_id).await.unwrap().expect("module");
    assert!(fetched.is_published());
    assert_eq!(fetched.materials()[0].url().as_str(), "https://example.org/lab.pdf");

    let assignment = PdAssignment::new(
        AssignmentId::new(0),
        module_id,
        teacher_id,
        fixed_now(),
        Some(fixed_now() + Duration::days(14)),
    )
    .unwrap();
    let assignment_id = repo.insert_assignment(&assignment).await.unwrap();

    let mut stored = repo
        .get_assignment(assignment_id)
        .await
        .unwrap()
        .expect("assignment");
    stored.complete(fixed_now() + Duration::days(1)).unwrap();
    repo.update_assignment(&stored).await.unwrap();

    let for_teacher = repo.list_for_teacher(teacher_id).await.unwrap();
    assert_eq!(for_teacher.len(), 1);
    assert_eq!(for_teacher[0].status(), AssignmentStatus::Completed);
    assert_eq!(repo.list_for_module(module_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_question_bank_keeps_order_and_unknown_types() {
    let repo = repo("memdb_questions").await;
    let bank = vec![
        RawQuestion::new("q2", "VIDEO", "Record", None),
        RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
        RawQuestion::new("q3", "ESSAY", "Write", None),
    ];
    repo.replace_questions(&bank).await.unwrap();
    assert_eq!(repo.list_questions().await.unwrap(), bank);

    repo.replace_questions(&bank[..1]).await.unwrap();
    assert_eq!(repo.list_questions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_attempt_answers_and_status_round_trip() {
    let repo = repo("memdb_attempts").await;
    let catalog = QuestionCatalog::partition(vec![
        RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
        RawQuestion::new("q2", "SHORT_ANSWER", "Explain", None),
    ])
    .catalog;
    let teacher_id = TeacherId::new(5);
    let mut attempt = Attempt::start(AttemptId::generate(), teacher_id, catalog, fixed_now());
    repo.upsert_attempt(&attempt).await.unwrap();

    attempt
        .record_answers(&[Answer::new(QuestionId::new("q1").unwrap(), "A")])
        .unwrap();
    attempt.mark_evaluated(fixed_now()).unwrap();
    repo.upsert_attempt(&attempt).await.unwrap();

    let latest = repo
        .latest_attempt_for_teacher(teacher_id)
        .await
        .unwrap()
        .expect("attempt");
    assert_eq!(latest.id(), attempt.id());
    assert_eq!(latest.status(), AttemptStatus::Evaluated);
    assert_eq!(latest.answers(), attempt.answers());
    assert_eq!(latest.questions().questions(Section::Mcq).len(), 1);
    assert_eq!(
        repo.get_attempt(attempt.id()).await.unwrap().as_ref(),
        Some(&latest)
    );
}
