use std::sync::Arc;

use tracing::instrument;

use pd_core::Clock;
use pd_core::filter::SchoolFilter;
use pd_core::model::{OnboardingLimit, School, SchoolDraft, SchoolId, SchoolStatus};
use storage::repository::SchoolRepository;

use crate::error::SchoolServiceError;
use crate::fault::FaultInjector;

/// Platform-admin workflow for registering and approving schools.
#[derive(Clone)]
pub struct SchoolOnboardingService {
    clock: Clock,
    schools: Arc<dyn SchoolRepository>,
    faults: FaultInjector,
}

impl SchoolOnboardingService {
    #[must_use]
    pub fn new(clock: Clock, schools: Arc<dyn SchoolRepository>) -> Self {
        Self {
            clock,
            schools,
            faults: FaultInjector::never(),
        }
    }

    #[must_use]
    pub fn with_faults(mut self, faults: FaultInjector) -> Self {
        self.faults = faults;
        self
    }

    /// Registers a school awaiting review.
    ///
    /// # Errors
    ///
    /// Returns `SchoolServiceError::School` for invalid drafts.
    /// Returns `SchoolServiceError::Storage` if persistence fails.
    pub async fn register(&self, draft: SchoolDraft) -> Result<SchoolId, SchoolServiceError> {
        let school = School::register(SchoolId::new(0), draft, self.clock.now())?;
        self.faults.run("register school").await?;
        let id = self.schools.insert_school(&school).await?;
        tracing::info!(school = %id, "school registered");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `SchoolServiceError::Storage` if repository access fails.
    pub async fn list(&self, filter: &SchoolFilter) -> Result<Vec<School>, SchoolServiceError> {
        let schools = self.schools.list_schools().await?;
        Ok(filter.apply(&schools).into_iter().cloned().collect())
    }

    /// Pending schools matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `SchoolServiceError::Storage` if repository access fails.
    pub async fn list_pending(&self, query: &str) -> Result<Vec<School>, SchoolServiceError> {
        self.list(&SchoolFilter::pending().with_query(query)).await
    }

    /// # Errors
    ///
    /// Returns `SchoolServiceError::NotFound` for unknown ids.
    pub async fn get(&self, id: SchoolId) -> Result<School, SchoolServiceError> {
        self.schools
            .get_school(id)
            .await?
            .ok_or(SchoolServiceError::NotFound(id))
    }

    /// Approves a pending school with an onboarding limit.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyProcessed` if the school is no longer pending,
    /// `NotFound` for unknown ids and `Unavailable` on a simulated failure.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        id: SchoolId,
        limit: OnboardingLimit,
    ) -> Result<School, SchoolServiceError> {
        let mut school = self.get(id).await?;
        school.approve(limit)?;
        self.faults.run("approve school").await?;
        self.decide(&school).await?;
        tracing::info!(school = %id, limit = limit.value(), "school approved");
        Ok(school)
    }

    /// # Errors
    ///
    /// Returns `AlreadyProcessed` if the school is no longer pending and
    /// `School(EmptyRejectionReason)` for a blank reason.
    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        id: SchoolId,
        reason: impl Into<String>,
    ) -> Result<School, SchoolServiceError> {
        let mut school = self.get(id).await?;
        school.reject(reason)?;
        self.faults.run("reject school").await?;
        self.decide(&school).await?;
        tracing::info!(school = %id, "school rejected");
        Ok(school)
    }

    /// Stores a decision only if the school is still pending, so overlapping
    /// approve/reject calls resolve to exactly one winner.
    async fn decide(&self, school: &School) -> Result<(), SchoolServiceError> {
        if self
            .schools
            .update_school_if_status(school, SchoolStatus::Pending)
            .await?
        {
            return Ok(());
        }
        let current = self.get(school.id()).await?;
        tracing::warn!(school = %school.id(), status = ?current.status(), "school decided concurrently");
        Err(SchoolServiceError::AlreadyProcessed {
            status: current.status(),
        })
    }

    /// # Errors
    ///
    /// Returns `School(NotApproved)` or `School(LimitNotIncreased)`.
    pub async fn raise_onboarding_limit(
        &self,
        id: SchoolId,
        limit: OnboardingLimit,
    ) -> Result<School, SchoolServiceError> {
        let mut school = self.get(id).await?;
        school.raise_onboarding_limit(limit)?;
        self.faults.run("update onboarding limit").await?;
        self.schools.update_school(&school).await?;
        Ok(school)
    }
}
