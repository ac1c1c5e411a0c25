use chrono::Duration;
use pd_core::filter::{ModuleFilter, SchoolFilter};
use pd_core::model::{
    Difficulty, Material, MaterialKind, ModuleDraft, OnboardingLimit, SchoolDraft, SchoolStatus,
    TeacherDraft,
};
use pd_core::time::fixed_now;
use services::{AppServices, Clock, RosterError, SchoolServiceError, ServicesConfig};

async fn services(name: &str) -> AppServices {
    services_with(name, &ServicesConfig::reliable()).await
}

async fn services_with(name: &str, config: &ServicesConfig) -> AppServices {
    AppServices::new_sqlite(
        &format!("sqlite:file:{name}?mode=memory&cache=shared"),
        Clock::fixed(fixed_now()),
        config,
    )
    .await
    .expect("sqlite services")
}

/// Every call waits long enough for two requests to overlap.
fn slow() -> ServicesConfig {
    ServicesConfig {
        latency: std::time::Duration::from_millis(50),
        ..ServicesConfig::reliable()
    }
}

fn northgate() -> SchoolDraft {
    SchoolDraft {
        name: "Northgate".into(),
        city: "Lusaka".into(),
        contact_email: "office@northgate.edu".into(),
    }
}

fn teacher(name: &str) -> TeacherDraft {
    TeacherDraft {
        name: name.into(),
        email: format!("{}@northgate.edu", name.to_lowercase()),
        subject: Some("Science".into()),
    }
}

#[tokio::test]
async fn second_approval_reports_already_processed() {
    let services = services("onboarding_twice").await;
    let schools = services.schools();
    let id = schools
        .register(SchoolDraft {
            name: "Northgate".into(),
            city: "Lusaka".into(),
            contact_email: "office@northgate.edu".into(),
        })
        .await
        .unwrap();

    schools
        .approve(id, OnboardingLimit::new(2).unwrap())
        .await
        .unwrap();
    let err = schools
        .approve(id, OnboardingLimit::new(2).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolServiceError::AlreadyProcessed { .. }));
    assert!(err.to_string().contains("already been processed"));

    let approved = schools
        .list(&SchoolFilter {
            status: Some(SchoolStatus::Approved),
            ..SchoolFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(approved.len(), 1);
}

#[tokio::test]
async fn approved_school_onboards_teachers_and_assigns_modules() {
    let services = services("onboarding_full").await;
    let school_id = services
        .schools()
        .register(SchoolDraft {
            name: "Northgate".into(),
            city: "Lusaka".into(),
            contact_email: "office@northgate.edu".into(),
        })
        .await
        .unwrap();
    services
        .schools()
        .approve(school_id, OnboardingLimit::new(2).unwrap())
        .await
        .unwrap();

    let roster = services.roster();
    let ada = roster.invite(school_id, teacher("Ada")).await.unwrap();
    let ben = roster.invite(school_id, teacher("Ben")).await.unwrap();
    let err = roster.invite(school_id, teacher("Cy")).await.unwrap_err();
    assert!(matches!(err, RosterError::LimitReached { limit: 2 }));
    roster.activate(ada.id()).await.unwrap();

    let catalog = services.catalog();
    let module = catalog
        .create(ModuleDraft {
            title: "Inquiry Science".into(),
            description: "Open-ended investigations".into(),
            competency: "Pedagogy".into(),
            difficulty: Difficulty::Intermediate,
            duration_minutes: 50,
        })
        .await
        .unwrap();
    catalog
        .add_material(
            module.id(),
            Material::new("Slides", MaterialKind::Document, "https://example.org/inquiry.pdf")
                .unwrap(),
        )
        .await
        .unwrap();
    catalog.publish(module.id()).await.unwrap();
    assert_eq!(catalog.list(&ModuleFilter::published()).await.unwrap().len(), 1);

    let outcome = services
        .assignments()
        .assign(
            module.id(),
            &[ada.id(), ben.id()],
            Some(fixed_now() + Duration::days(14)),
        )
        .await
        .unwrap();
    assert_eq!(outcome.created.len(), 2);
    services
        .assignments()
        .complete(outcome.created[0].id())
        .await
        .unwrap();

    let overview = services.dashboard().school_overview(school_id).await.unwrap();
    assert_eq!(overview.capacity.enrolled, 2);
    assert_eq!(overview.active_teachers, 1);
    assert_eq!(overview.assignments.completed, 1);
    assert_eq!(overview.assignments.open(), 1);

    let admin = services.dashboard().admin_overview().await.unwrap();
    assert_eq!(admin.approved_schools, 1);
    assert_eq!(admin.teachers, 2);
}

#[tokio::test]
async fn overlapping_approvals_decide_the_school_once() {
    let services = services_with("onboarding_overlap", &slow()).await;
    let schools = services.schools();
    let id = schools.register(northgate()).await.unwrap();
    let limit = OnboardingLimit::new(3).unwrap();

    let (first, second) = tokio::join!(schools.approve(id, limit), schools.approve(id, limit));
    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let err = first.err().or(second.err()).unwrap();
    assert!(matches!(
        err,
        SchoolServiceError::AlreadyProcessed {
            status: SchoolStatus::Approved
        }
    ));

    let other = schools.register(northgate()).await.unwrap();
    let (approved, rejected) = tokio::join!(
        schools.approve(other, limit),
        schools.reject(other, "Incomplete paperwork")
    );
    assert_ne!(approved.is_ok(), rejected.is_ok());
    let stored = schools.get(other).await.unwrap();
    let expected = if approved.is_ok() {
        SchoolStatus::Approved
    } else {
        SchoolStatus::Rejected
    };
    assert_eq!(stored.status(), expected);
}

#[tokio::test]
async fn overlapping_invites_respect_the_onboarding_limit() {
    let services = services_with("onboarding_invite_overlap", &slow()).await;
    let school_id = services.schools().register(northgate()).await.unwrap();
    services
        .schools()
        .approve(school_id, OnboardingLimit::new(1).unwrap())
        .await
        .unwrap();

    let roster = services.roster();
    let (ada, ben) = tokio::join!(
        roster.invite(school_id, teacher("Ada")),
        roster.invite(school_id, teacher("Ben"))
    );
    assert_ne!(ada.is_ok(), ben.is_ok());
    let err = ada.err().or(ben.err()).unwrap();
    assert!(matches!(err, RosterError::LimitReached { limit: 1 }));
    assert_eq!(roster.capacity(school_id).await.unwrap().enrolled, 1);
}
