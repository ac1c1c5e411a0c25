use std::sync::Arc;

use tracing::instrument;

use pd_core::model::{AttemptId, AttemptStatus, Section, TeacherId};

use crate::assessment::loader::{CatalogLoader, LoadReport};
use crate::assessment::page::{MediaAnswerPolicy, PageTransition, SectionPage};
use crate::assessment::persistence::{ProgressSaver, SaveOutcome};
use crate::assessment::session::{AssessmentSession, CatalogState, SessionHandle, session_handle};
use crate::assessment::submit::{SubmitProgress, SubmitReceipt, SubmitReview, Submitter};
use crate::content::AssessmentContent;
use crate::error::{AssessmentError, PageError, SubmitError};
use crate::fault::FaultInjector;

/// Summary returned when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub attempt_id: AttemptId,
    pub status: AttemptStatus,
    pub catalog: CatalogState,
    /// First section with questions, `None` when the catalog is empty or failed.
    pub first_section: Option<Section>,
    pub answered: usize,
}

/// Orchestrates the competency assessment over the shared session slot.
#[derive(Clone)]
pub struct AssessmentService {
    content: Arc<dyn AssessmentContent>,
    loader: CatalogLoader,
    saver: ProgressSaver,
    submitter: Submitter,
    faults: FaultInjector,
    media_policy: MediaAnswerPolicy,
    handle: SessionHandle,
}

impl AssessmentService {
    #[must_use]
    pub fn new(content: Arc<dyn AssessmentContent>, faults: FaultInjector) -> Self {
        Self {
            loader: CatalogLoader::new(Arc::clone(&content)),
            saver: ProgressSaver::new(Arc::clone(&content)),
            submitter: Submitter::new(Arc::clone(&content), faults.clone()),
            content,
            faults,
            media_policy: MediaAnswerPolicy::default(),
            handle: session_handle(),
        }
    }

    #[must_use]
    pub fn with_media_policy(mut self, policy: MediaAnswerPolicy) -> Self {
        self.media_policy = policy;
        self
    }

    /// The slot every page reads the active session from.
    #[must_use]
    pub fn session(&self) -> SessionHandle {
        Arc::clone(&self.handle)
    }

    #[must_use]
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Starts (or picks up the open) attempt and installs a fresh session.
    ///
    /// A catalog that fails to load is reported in `SessionStart::catalog`
    /// rather than as an error so the page can offer a retry.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Content` when the attempt cannot be started.
    #[instrument(skip(self))]
    pub async fn start(&self, teacher_id: TeacherId) -> Result<SessionStart, AssessmentError> {
        let attempt = self.content.start_competency_attempt(teacher_id).await?;
        tracing::info!(attempt = %attempt.id(), "competency attempt started");
        self.install(AssessmentSession::begin(attempt)).await
    }

    /// Reopens the teacher's latest attempt, evaluated or not.
    ///
    /// # Errors
    ///
    /// Returns `NoAttempt` when the teacher never started one.
    #[instrument(skip(self))]
    pub async fn resume(&self, teacher_id: TeacherId) -> Result<SessionStart, AssessmentError> {
        let attempt = self
            .content
            .get_competency_attempt(teacher_id)
            .await?
            .ok_or(AssessmentError::NoAttempt(teacher_id))?;
        tracing::info!(attempt = %attempt.id(), status = attempt.status().as_str(), "competency attempt resumed");
        self.install(AssessmentSession::begin(attempt)).await
    }

    async fn install(&self, mut session: AssessmentSession) -> Result<SessionStart, AssessmentError> {
        match self.loader.ensure_loaded(&mut session).await {
            Ok(_) | Err(AssessmentError::CatalogUnavailable(_)) => {}
            Err(err) => return Err(err),
        }
        let start = SessionStart {
            attempt_id: session.attempt_id(),
            status: session.attempt().status(),
            catalog: session.catalog_state().clone(),
            first_section: session.catalog().first_non_empty(),
            answered: session.answers().len(),
        };

        let mut slot = self.handle.lock().await;
        if let Some(previous) = slot.as_mut() {
            previous.teardown();
        }
        *slot = Some(session);
        Ok(start)
    }

    /// Re-fetches questions after a failed load.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` without an open session and
    /// `CatalogUnavailable` when the fetch fails again.
    pub async fn retry_catalog(&self) -> Result<LoadReport, AssessmentError> {
        let mut slot = self.handle.lock().await;
        let session = slot.as_mut().ok_or(AssessmentError::SessionClosed)?;
        self.loader.retry(session).await
    }

    /// Builds the page for `section` of `attempt`, ready to answer when it
    /// has questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed`, `AttemptNotOpen` when another attempt holds
    /// the slot, or `CatalogUnavailable`.
    pub async fn open_section(
        &self,
        attempt: AttemptId,
        section: Section,
    ) -> Result<SectionPage, AssessmentError> {
        let mut slot = self.handle.lock().await;
        let session = open_attempt(&mut slot, attempt)?;
        self.loader.ensure_loaded(session).await?;
        let mut page = SectionPage::new(section).with_media_policy(self.media_policy);
        page.refresh(session);
        Ok(page)
    }

    /// Runs `f` against the open session.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` when nothing is open.
    pub async fn with_session<R>(
        &self,
        f: impl FnOnce(&mut AssessmentSession) -> R,
    ) -> Result<R, AssessmentError> {
        let mut slot = self.handle.lock().await;
        let session = slot.as_mut().ok_or(AssessmentError::SessionClosed)?;
        Ok(f(session))
    }

    /// Runs `f` against the open session when it belongs to `attempt`.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` or `AttemptNotOpen`.
    pub async fn with_attempt<R>(
        &self,
        attempt: AttemptId,
        f: impl FnOnce(&mut AssessmentSession) -> R,
    ) -> Result<R, AssessmentError> {
        let mut slot = self.handle.lock().await;
        let session = open_attempt(&mut slot, attempt)?;
        Ok(f(session))
    }

    /// Presses "Next" on `page` of `attempt`.
    ///
    /// # Errors
    ///
    /// See [`SectionPage::next`].
    pub async fn next(
        &self,
        attempt: AttemptId,
        page: &mut SectionPage,
    ) -> Result<PageTransition, PageError> {
        let mut slot = self.handle.lock().await;
        let session = open_attempt(&mut slot, attempt)?;
        page.next(session, &self.saver, &self.faults).await
    }

    /// Saves the current answer set outside of a transition.
    pub async fn save_progress(&self) -> SaveOutcome {
        let mut slot = self.handle.lock().await;
        match slot.as_mut() {
            Some(session) => self.saver.save_after_transition(session).await,
            None => SaveOutcome::Skipped,
        }
    }

    /// # Errors
    ///
    /// Returns `SessionClosed` or `AttemptNotOpen`.
    pub async fn review(&self, attempt: AttemptId) -> Result<SubmitReview, AssessmentError> {
        self.with_attempt(attempt, |session| SubmitReview::from_session(session))
            .await
    }

    /// Submits the open session. The closed session stays in the slot so a
    /// second submit is rejected.
    ///
    /// # Errors
    ///
    /// See [`Submitter::submit`].
    #[instrument(skip(self, on_progress))]
    pub async fn submit(
        &self,
        attempt: AttemptId,
        on_progress: impl FnMut(SubmitProgress) + Send,
    ) -> Result<SubmitReceipt, SubmitError> {
        let mut slot = self.handle.lock().await;
        let session = slot.as_mut().ok_or(SubmitError::AlreadySubmitted)?;
        if session.attempt_id() != attempt {
            return Err(SubmitError::NotOpen(attempt));
        }
        self.submitter.submit(session, on_progress).await
    }

    /// Tears the session down when the teacher leaves the flow.
    pub async fn leave(&self) {
        let mut slot = self.handle.lock().await;
        if let Some(mut session) = slot.take() {
            session.teardown();
        }
    }
}

fn open_attempt(
    slot: &mut Option<AssessmentSession>,
    attempt: AttemptId,
) -> Result<&mut AssessmentSession, AssessmentError> {
    let session = slot.as_mut().ok_or(AssessmentError::SessionClosed)?;
    if session.attempt_id() != attempt {
        tracing::warn!(requested = %attempt, open = %session.attempt_id(), "attempt is not open");
        return Err(AssessmentError::AttemptNotOpen(attempt));
    }
    Ok(session)
}
