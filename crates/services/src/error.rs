//! Shared error types for the services crate.

use thiserror::Error;

use pd_core::model::{
    AssignmentError, AttemptError, AttemptId, ModuleError, ModuleId, SchoolError, SchoolId, SchoolStatus,
    Section, TeacherError, TeacherId,
};
use pd_core::validation::ValidationError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// A failure produced on purpose by a `FaultInjector`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("network error during {operation}, please try again")]
pub struct InjectedFailure {
    pub operation: &'static str,
}

/// Errors emitted by assessment-content backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error(transparent)]
    Injected(#[from] InjectedFailure),
    #[error("content service request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error("competency attempt not found")]
    AttemptNotFound,
}

/// Errors emitted by the assessment session and its orchestrator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment session is closed")]
    SessionClosed,
    #[error("assessment {0} is not open")]
    AttemptNotOpen(AttemptId),
    #[error("questions could not be loaded: {0}")]
    CatalogUnavailable(String),
    #[error("no competency attempt for teacher {0}")]
    NoAttempt(TeacherId),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Errors emitted by a section page when the teacher presses "Next".
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PageError {
    #[error("this section is not ready yet")]
    NotReady,
    #[error("an answer is already being saved")]
    Busy,
    #[error("this answer is locked, contact support to change your answer")]
    AnswerLocked,
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("network error, please try again")]
    Network(#[source] ContentError),
    #[error(transparent)]
    Session(#[from] AssessmentError),
}

/// Errors emitted by the submit step.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("assessment has already been submitted")]
    AlreadySubmitted,
    #[error("assessment {0} is not open")]
    NotOpen(AttemptId),
    #[error("sections still incomplete: {0:?}")]
    Incomplete(Vec<Section>),
    #[error("network error, please try again")]
    Network(#[source] ContentError),
}

/// Errors emitted by `SchoolOnboardingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchoolServiceError {
    #[error("school {0} not found")]
    NotFound(SchoolId),
    #[error("school has already been processed ({status:?})")]
    AlreadyProcessed { status: SchoolStatus },
    #[error(transparent)]
    School(SchoolError),
    #[error(transparent)]
    Unavailable(#[from] InjectedFailure),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SchoolError> for SchoolServiceError {
    fn from(err: SchoolError) -> Self {
        match err {
            SchoolError::AlreadyProcessed { status } => Self::AlreadyProcessed { status },
            other => Self::School(other),
        }
    }
}

/// Errors emitted by `TeacherRosterService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RosterError {
    #[error("school {0} not found")]
    SchoolNotFound(SchoolId),
    #[error("teacher {0} not found")]
    TeacherNotFound(TeacherId),
    #[error("school is not approved for onboarding")]
    SchoolNotApproved,
    #[error("onboarding limit of {limit} teachers reached")]
    LimitReached { limit: u32 },
    #[error("a teacher with email {0} is already on this roster")]
    DuplicateEmail(String),
    #[error(transparent)]
    Teacher(#[from] TeacherError),
    #[error(transparent)]
    Unavailable(#[from] InjectedFailure),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PdCatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("module {0} not found")]
    NotFound(ModuleId),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Unavailable(#[from] InjectedFailure),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PdAssignmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssignmentServiceError {
    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),
    #[error("module {0} is not published")]
    ModuleNotPublished(ModuleId),
    #[error("teacher {0} not found")]
    TeacherNotFound(TeacherId),
    #[error("teacher {0} is inactive")]
    TeacherInactive(TeacherId),
    #[error("assignment not found")]
    NotFound,
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Unavailable(#[from] InjectedFailure),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error("school {0} not found")]
    SchoolNotFound(SchoolId),
    #[error("teacher {0} not found")]
    TeacherNotFound(TeacherId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_processed_is_lifted_out_of_school_errors() {
        let err = SchoolServiceError::from(SchoolError::AlreadyProcessed {
            status: SchoolStatus::Approved,
        });
        assert!(matches!(
            err,
            SchoolServiceError::AlreadyProcessed {
                status: SchoolStatus::Approved
            }
        ));
        assert_eq!(
            err.to_string(),
            "school has already been processed (Approved)"
        );

        let err = SchoolServiceError::from(SchoolError::NotApproved);
        assert!(matches!(err, SchoolServiceError::School(_)));
    }

    #[test]
    fn injected_failure_reads_like_a_toast() {
        let err = ContentError::from(InjectedFailure {
            operation: "save progress",
        });
        assert_eq!(
            err.to_string(),
            "network error during save progress, please try again"
        );
    }
}
