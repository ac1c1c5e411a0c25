use std::sync::Arc;
use std::time::Duration;

use storage::repository::Storage;

use crate::Clock;
use crate::assessment::{AssessmentService, MediaAnswerPolicy};
use crate::assignments::PdAssignmentService;
use crate::catalog::PdCatalogService;
use crate::content::{AssessmentContent, HttpContent, HttpContentConfig, SimulatedContent, StoredContent};
use crate::dashboard::DashboardService;
use crate::error::AppServicesError;
use crate::fault::{DEFAULT_FAILURE_RATE, FaultInjector};
use crate::roster::TeacherRosterService;
use crate::schools::SchoolOnboardingService;

/// Where competency questions and attempts come from.
#[derive(Debug, Clone, Default)]
pub enum ContentBackend {
    #[default]
    Stored,
    Http(HttpContentConfig),
}

/// Knobs shared by every service.
#[derive(Debug, Clone)]
pub struct ServicesConfig {
    pub failure_rate: f64,
    pub latency: Duration,
    /// Fixes the fault injector's random sequence when set.
    pub seed: Option<u64>,
    pub content: ContentBackend,
    pub media_policy: MediaAnswerPolicy,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            failure_rate: DEFAULT_FAILURE_RATE,
            latency: Duration::from_millis(400),
            seed: None,
            content: ContentBackend::Stored,
            media_policy: MediaAnswerPolicy::Locked,
        }
    }
}

impl ServicesConfig {
    /// No latency and no injected failures.
    #[must_use]
    pub fn reliable() -> Self {
        Self {
            failure_rate: 0.0,
            latency: Duration::ZERO,
            ..Self::default()
        }
    }

    fn faults(&self) -> FaultInjector {
        let faults = match self.seed {
            Some(seed) => FaultInjector::seeded(self.failure_rate, seed),
            None => FaultInjector::with_rate(self.failure_rate),
        };
        faults.with_latency(self.latency)
    }
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    schools: Arc<SchoolOnboardingService>,
    roster: Arc<TeacherRosterService>,
    catalog: Arc<PdCatalogService>,
    assignments: Arc<PdAssignmentService>,
    dashboard: Arc<DashboardService>,
    assessment: Arc<AssessmentService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, config: &ServicesConfig) -> Self {
        let faults = config.faults();

        let stored = StoredContent::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
        );
        let content: Arc<dyn AssessmentContent> = match &config.content {
            ContentBackend::Stored => Arc::new(stored),
            ContentBackend::Http(http) => Arc::new(HttpContent::new(http.clone())),
        };
        // Page uploads roll their own faults; the backend only adds latency.
        let content: Arc<dyn AssessmentContent> = Arc::new(SimulatedContent::new(
            content,
            FaultInjector::never().with_latency(config.latency),
        ));

        let schools = SchoolOnboardingService::new(clock, Arc::clone(&storage.schools))
            .with_faults(faults.clone());
        let roster = TeacherRosterService::new(
            clock,
            Arc::clone(&storage.schools),
            Arc::clone(&storage.teachers),
        )
        .with_faults(faults.clone());
        let catalog = PdCatalogService::new(clock, Arc::clone(&storage.modules))
            .with_faults(faults.clone());
        let assignments = PdAssignmentService::new(
            clock,
            Arc::clone(&storage.modules),
            Arc::clone(&storage.teachers),
            Arc::clone(&storage.assignments),
        )
        .with_faults(faults.clone());
        let dashboard = DashboardService::new(
            clock,
            Arc::clone(&storage.schools),
            Arc::clone(&storage.teachers),
            Arc::clone(&storage.modules),
            Arc::clone(&storage.assignments),
            Arc::clone(&storage.attempts),
        );
        let assessment =
            AssessmentService::new(content, faults).with_media_policy(config.media_policy);

        Self {
            clock,
            schools: Arc::new(schools),
            roster: Arc::new(roster),
            catalog: Arc::new(catalog),
            assignments: Arc::new(assignments),
            dashboard: Arc::new(dashboard),
            assessment: Arc::new(assessment),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: &ServicesConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, config))
    }

    /// The clock every service shares; views use it for due-date labels.
    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn schools(&self) -> Arc<SchoolOnboardingService> {
        Arc::clone(&self.schools)
    }

    #[must_use]
    pub fn roster(&self) -> Arc<TeacherRosterService> {
        Arc::clone(&self.roster)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<PdCatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<PdAssignmentService> {
        Arc::clone(&self.assignments)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn assessment(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::{SchoolDraft, TeacherId};
    use pd_core::time::fixed_clock;

    #[tokio::test]
    async fn services_share_one_storage() {
        let storage = Storage::in_memory();
        storage
            .questions
            .replace_questions(&storage::seed::demo_questions())
            .await
            .unwrap();
        let services = AppServices::new(&storage, fixed_clock(), &ServicesConfig::reliable());

        let id = services
            .schools()
            .register(SchoolDraft {
                name: "Westfield".into(),
                city: "Leeds".into(),
                contact_email: "office@westfield.sch.uk".into(),
            })
            .await
            .unwrap();
        let overview = services.dashboard().admin_overview().await.unwrap();
        assert_eq!(overview.pending_schools, 1);
        assert!(services.schools().get(id).await.is_ok());

        let start = services.assessment().start(TeacherId::new(1)).await.unwrap();
        assert!(start.first_section.is_some());
        let teacher = services.dashboard().teacher_overview(TeacherId::new(1)).await;
        assert!(teacher.is_err());
    }

    #[test]
    fn default_config_uses_demo_failure_rate() {
        let config = ServicesConfig::default();
        assert_eq!(config.failure_rate, DEFAULT_FAILURE_RATE);
        assert_eq!(config.faults().latency(), Duration::from_millis(400));
    }
}
