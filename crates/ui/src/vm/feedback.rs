use std::fmt;

use services::{
    AssessmentError, AssignmentServiceError, CatalogServiceError, DashboardError, RosterError,
    SchoolServiceError,
};

use crate::routes::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient message shown over the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    /// Error toasts show the error's own message; nothing is retried.
    #[must_use]
    pub fn error(err: &impl fmt::Display) -> Self {
        Self {
            kind: ToastKind::Error,
            message: err.to_string(),
        }
    }
}

/// What a detail page shows once its data resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<T> {
    Ready(T),
    /// The record is gone; send the user to the parent listing.
    RedirectTo(Route),
}

/// Errors that mean "this record does not exist" rather than "try again".
pub trait NotFound {
    fn is_not_found(&self) -> bool;
}

impl NotFound for SchoolServiceError {
    fn is_not_found(&self) -> bool {
        matches!(self, SchoolServiceError::NotFound(_))
    }
}

impl NotFound for RosterError {
    fn is_not_found(&self) -> bool {
        matches!(
            self,
            RosterError::SchoolNotFound(_) | RosterError::TeacherNotFound(_)
        )
    }
}

impl NotFound for CatalogServiceError {
    fn is_not_found(&self) -> bool {
        matches!(self, CatalogServiceError::NotFound(_))
    }
}

impl NotFound for AssignmentServiceError {
    fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssignmentServiceError::NotFound
                | AssignmentServiceError::ModuleNotFound(_)
                | AssignmentServiceError::TeacherNotFound(_)
        )
    }
}

impl NotFound for DashboardError {
    fn is_not_found(&self) -> bool {
        matches!(
            self,
            DashboardError::SchoolNotFound(_) | DashboardError::TeacherNotFound(_)
        )
    }
}

impl NotFound for AssessmentError {
    fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssessmentError::NoAttempt(_)
                | AssessmentError::SessionClosed
                | AssessmentError::AttemptNotOpen(_)
        )
    }
}

/// Maps a lookup result onto a page resolution: missing records redirect to
/// `parent`, other errors pass through.
///
/// # Errors
///
/// Returns the original error unless it is a not-found error.
pub fn resolve<T, E: NotFound>(result: Result<T, E>, parent: Route) -> Result<Resolution<T>, E> {
    match result {
        Ok(value) => Ok(Resolution::Ready(value)),
        Err(err) if err.is_not_found() => Ok(Resolution::RedirectTo(parent)),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::{AttemptId, SchoolId, SchoolStatus};

    #[test]
    fn missing_school_redirects_to_listing() {
        let result: Result<u32, _> = Err(SchoolServiceError::NotFound(SchoolId::new(9)));
        let resolved = resolve(result, Route::AdminSchools {}).unwrap();
        assert_eq!(resolved, Resolution::RedirectTo(Route::AdminSchools {}));

        let ok: Result<u32, SchoolServiceError> = Ok(3);
        assert_eq!(
            resolve(ok, Route::AdminSchools {}).unwrap(),
            Resolution::Ready(3)
        );
    }

    #[test]
    fn assessment_urls_for_another_attempt_redirect_home() {
        let result: Result<(), _> = Err(AssessmentError::AttemptNotOpen(AttemptId::generate()));
        assert_eq!(
            resolve(result, Route::TeacherHome {}).unwrap(),
            Resolution::RedirectTo(Route::TeacherHome {})
        );

        let failed: Result<(), _> = Err(AssessmentError::CatalogUnavailable("timeout".into()));
        assert!(resolve(failed, Route::TeacherHome {}).is_err());
    }

    #[test]
    fn other_errors_become_toasts() {
        let result: Result<u32, _> = Err(SchoolServiceError::AlreadyProcessed {
            status: SchoolStatus::Approved,
        });
        let err = resolve(result, Route::AdminSchools {}).unwrap_err();
        let toast = Toast::error(&err);
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.contains("already been processed"));
    }
}
