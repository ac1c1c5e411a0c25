mod loader;
mod page;
mod persistence;
mod service;
mod session;
mod submit;

// Public API of the assessment subsystem.
pub use crate::error::{AssessmentError, PageError, SubmitError};
pub use loader::{CatalogLoader, LoadReport};
pub use page::{AnswerInput, MediaAnswerPolicy, PageState, PageTransition, SectionPage};
pub use persistence::{ProgressSaver, SaveOutcome};
pub use service::{AssessmentService, SessionStart};
pub use session::{AssessmentSession, CatalogState, SessionHandle, session_handle};
pub use submit::{SUBMIT_STEP, SectionStatus, SubmitProgress, SubmitReceipt, SubmitReview, Submitter};
