use std::sync::Arc;

use pd_core::model::{
    Answer, AnswerStore, Attempt, AttemptError, AttemptId, QuestionCatalog, Section, TeacherId,
};

use crate::error::AssessmentError;

/// Whether the question list for the attempt is usable yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogState {
    #[default]
    NotLoaded,
    Ready,
    /// The last fetch failed; pages show the message and offer a retry.
    Failed(String),
}

impl CatalogState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, CatalogState::Ready)
    }
}

/// In-memory state of one teacher's pass through the assessment.
///
/// Created by [`AssessmentSession::begin`] when the teacher starts or resumes
/// an attempt and closed by [`AssessmentSession::teardown`] on submit or when
/// the teacher leaves the flow. Every mutation after teardown fails with
/// `AssessmentError::SessionClosed`.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    attempt: Attempt,
    catalog: QuestionCatalog,
    catalog_state: CatalogState,
    answers: AnswerStore,
    closed: bool,
}

impl AssessmentSession {
    /// Opens a session over `attempt`, seeding answers from what was last saved.
    ///
    /// Pre-grouped questions carried by the attempt are used directly; an
    /// attempt without questions leaves the catalog for the loader.
    #[must_use]
    pub fn begin(attempt: Attempt) -> Self {
        let catalog = attempt.questions().clone();
        let catalog_state = if catalog.is_populated() {
            CatalogState::Ready
        } else {
            CatalogState::NotLoaded
        };
        let answers = AnswerStore::from_answers(attempt.answers().iter().cloned());
        Self {
            attempt,
            catalog,
            catalog_state,
            answers,
            closed: false,
        }
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt.id()
    }

    #[must_use]
    pub fn teacher_id(&self) -> TeacherId {
        self.attempt.teacher_id()
    }

    #[must_use]
    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog_state
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.attempt.is_read_only()
    }

    /// Number of answered questions in `section`.
    #[must_use]
    pub fn answered_in(&self, section: Section) -> usize {
        self.answers.answered_in(self.catalog.ids(section))
    }

    /// Upserts an answer into the live store.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` after teardown and `Attempt(Finalized)` when the
    /// attempt has already been evaluated.
    pub fn record(&mut self, answer: Answer) -> Result<(), AssessmentError> {
        self.ensure_open()?;
        if self.attempt.is_read_only() {
            return Err(AttemptError::Finalized.into());
        }
        self.answers.add_answer(answer);
        Ok(())
    }

    /// Closes the session. Idempotent.
    pub fn teardown(&mut self) {
        if !self.closed {
            tracing::debug!(attempt = %self.attempt.id(), "assessment session closed");
        }
        self.closed = true;
    }

    pub(crate) fn ensure_open(&self) -> Result<(), AssessmentError> {
        if self.closed {
            Err(AssessmentError::SessionClosed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn install_catalog(&mut self, catalog: QuestionCatalog) {
        self.catalog = catalog;
        self.catalog_state = CatalogState::Ready;
    }

    pub(crate) fn mark_catalog_failed(&mut self, message: String) {
        self.catalog_state = CatalogState::Failed(message);
    }

    /// Copies the live answers into the attempt record after a successful save.
    pub(crate) fn sync_attempt(&mut self) -> Result<(), AttemptError> {
        self.attempt.record_answers(self.answers.answers())
    }
}

/// The process-wide slot holding the active session, shared by every page.
pub type SessionHandle = Arc<tokio::sync::Mutex<Option<AssessmentSession>>>;

#[must_use]
pub fn session_handle() -> SessionHandle {
    Arc::new(tokio::sync::Mutex::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::{QuestionId, RawQuestion};
    use pd_core::time::fixed_now;

    fn attempt_with(questions: QuestionCatalog, answers: &[Answer]) -> Attempt {
        let mut attempt = Attempt::start(AttemptId::generate(), TeacherId::new(1), questions, fixed_now());
        attempt.record_answers(answers).unwrap();
        attempt
    }

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::partition(vec![
            RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
            RawQuestion::new("q2", "SHORT_ANSWER", "Explain", None),
        ])
        .catalog
    }

    fn answer(id: &str, value: &str) -> Answer {
        Answer::new(QuestionId::new(id).unwrap(), value)
    }

    #[test]
    fn begin_seeds_answers_and_catalog_from_attempt() {
        let session = AssessmentSession::begin(attempt_with(catalog(), &[answer("q1", "A")]));
        assert!(session.catalog_state().is_ready());
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answered_in(Section::Mcq), 1);
        assert_eq!(session.answered_in(Section::ShortAnswer), 0);
    }

    #[test]
    fn attempt_without_questions_waits_for_loader() {
        let session = AssessmentSession::begin(attempt_with(QuestionCatalog::new(), &[]));
        assert_eq!(session.catalog_state(), &CatalogState::NotLoaded);
    }

    #[test]
    fn record_upserts_and_teardown_blocks_further_writes() {
        let mut session = AssessmentSession::begin(attempt_with(catalog(), &[]));
        session.record(answer("q1", "A")).unwrap();
        session.record(answer("q1", "B")).unwrap();
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers().answers()[0].answer, "B");

        session.teardown();
        session.teardown();
        assert!(session.is_closed());
        assert!(matches!(
            session.record(answer("q2", "text")),
            Err(AssessmentError::SessionClosed)
        ));
    }

    #[test]
    fn evaluated_attempt_rejects_new_answers() {
        let mut attempt = attempt_with(catalog(), &[]);
        attempt.mark_evaluated(fixed_now()).unwrap();
        let mut session = AssessmentSession::begin(attempt);
        assert!(session.is_read_only());
        assert!(matches!(
            session.record(answer("q1", "A")),
            Err(AssessmentError::Attempt(AttemptError::Finalized))
        ));
    }
}
