use std::sync::Arc;

use pd_core::model::{AttemptId, Section};

use crate::assessment::session::AssessmentSession;
use crate::content::AssessmentContent;
use crate::error::{ContentError, SubmitError};
use crate::fault::FaultInjector;

/// Progress increment reported while a submission is running.
pub const SUBMIT_STEP: u8 = 20;

/// Completion of one section, derived from the live answer store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionStatus {
    pub section: Section,
    pub answered: usize,
    pub total: usize,
}

impl SectionStatus {
    /// Sections without questions count as complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered >= self.total
    }
}

/// The review screen shown before submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReview {
    sections: Vec<SectionStatus>,
}

impl SubmitReview {
    #[must_use]
    pub fn from_session(session: &AssessmentSession) -> Self {
        let sections = Section::ORDER
            .into_iter()
            .map(|section| SectionStatus {
                section,
                answered: session.answered_in(section),
                total: session.catalog().questions(section).len(),
            })
            .collect();
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionStatus] {
        &self.sections
    }

    #[must_use]
    pub fn incomplete(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|s| !s.is_complete())
            .map(|s| s.section)
            .collect()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.sections.iter().all(SectionStatus::is_complete)
    }
}

/// Percentage reported to the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmitProgress(u8);

impl SubmitProgress {
    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_done(self) -> bool {
        self.0 >= 100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub attempt_id: AttemptId,
    pub answers: usize,
}

/// Sends the final answer set and closes the session.
#[derive(Clone)]
pub struct Submitter {
    content: Arc<dyn AssessmentContent>,
    faults: FaultInjector,
}

impl Submitter {
    #[must_use]
    pub fn new(content: Arc<dyn AssessmentContent>, faults: FaultInjector) -> Self {
        Self { content, faults }
    }

    /// Runs the submission, reporting 0 to 100 in steps of [`SUBMIT_STEP`].
    ///
    /// Single-fire: once this succeeds the session is torn down.
    ///
    /// # Errors
    ///
    /// - `AlreadySubmitted` when the session is closed or the attempt evaluated.
    /// - `Incomplete` when a section still has unanswered questions.
    /// - `Network` when the final save fails; the session stays open.
    pub async fn submit(
        &self,
        session: &mut AssessmentSession,
        mut on_progress: impl FnMut(SubmitProgress) + Send,
    ) -> Result<SubmitReceipt, SubmitError> {
        if session.is_closed() || session.is_read_only() {
            return Err(SubmitError::AlreadySubmitted);
        }
        let review = SubmitReview::from_session(session);
        if !review.can_submit() {
            return Err(SubmitError::Incomplete(review.incomplete()));
        }

        let mut percent = 0;
        on_progress(SubmitProgress(percent));
        while percent + SUBMIT_STEP < 100 {
            self.faults.delay().await;
            percent += SUBMIT_STEP;
            on_progress(SubmitProgress(percent));
        }

        self.faults
            .run("submit assessment")
            .await
            .map_err(|err| SubmitError::Network(ContentError::from(err)))?;
        let attempt_id = session.attempt_id();
        let answers = session.answers().answers().to_vec();
        self.content
            .save_competency_progress(attempt_id, &answers)
            .await
            .map_err(SubmitError::Network)?;
        if let Err(err) = session.sync_attempt() {
            tracing::warn!(attempt = %attempt_id, error = %err, "submitted answers could not be mirrored");
        }

        on_progress(SubmitProgress(100));
        session.teardown();
        tracing::info!(attempt = %attempt_id, answers = answers.len(), "assessment submitted");
        Ok(SubmitReceipt {
            attempt_id,
            answers: answers.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{SimulatedContent, StoredContent};
    use pd_core::model::{Answer, QuestionId, RawQuestion, TeacherId};
    use pd_core::time::fixed_clock;
    use storage::repository::Storage;

    async fn setup() -> (AssessmentSession, StoredContent) {
        let storage = Storage::in_memory();
        storage
            .questions
            .replace_questions(&[
                RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
                RawQuestion::new("q2", "VIDEO", "Record", None),
            ])
            .await
            .unwrap();
        let content = StoredContent::new(
            fixed_clock(),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
        );
        let attempt = content
            .start_competency_attempt(TeacherId::new(9))
            .await
            .unwrap();
        (AssessmentSession::begin(attempt), content)
    }

    fn answer(id: &str, value: &str) -> Answer {
        Answer::new(QuestionId::new(id).unwrap(), value)
    }

    #[tokio::test]
    async fn review_counts_empty_sections_as_complete() {
        let (mut session, _) = setup().await;
        session.record(answer("q1", "A")).unwrap();

        let review = SubmitReview::from_session(&session);
        assert!(!review.can_submit());
        assert_eq!(review.incomplete(), vec![Section::Video]);
        let short = review.sections()[Section::ShortAnswer.position()];
        assert_eq!((short.answered, short.total), (0, 0));
        assert!(short.is_complete());
    }

    #[tokio::test]
    async fn submit_reports_progress_and_fires_once() {
        let (mut session, content) = setup().await;
        session.record(answer("q1", "A")).unwrap();
        session.record(answer("q2", "clip.mp4")).unwrap();
        let submitter = Submitter::new(Arc::new(content.clone()), FaultInjector::never());

        let mut seen = Vec::new();
        let receipt = submitter
            .submit(&mut session, |p| seen.push(p.percent()))
            .await
            .unwrap();
        assert_eq!(seen, vec![0, 20, 40, 60, 80, 100]);
        assert_eq!(receipt.answers, 2);
        assert!(session.is_closed());

        let saved = content
            .get_competency_attempt(TeacherId::new(9))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.answers().len(), 2);

        let err = submitter.submit(&mut session, |_| {}).await.unwrap_err();
        assert!(matches!(err, SubmitError::AlreadySubmitted));
    }

    #[tokio::test]
    async fn incomplete_sections_block_submit() {
        let (mut session, content) = setup().await;
        let submitter = Submitter::new(Arc::new(content), FaultInjector::never());
        let err = submitter.submit(&mut session, |_| {}).await.unwrap_err();
        assert!(matches!(err, SubmitError::Incomplete(ref s) if s == &[Section::Mcq, Section::Video]));
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn network_failure_keeps_session_open() {
        let (mut session, content) = setup().await;
        session.record(answer("q1", "A")).unwrap();
        session.record(answer("q2", "clip.mp4")).unwrap();
        let submitter = Submitter::new(
            Arc::new(SimulatedContent::new(content, FaultInjector::always())),
            FaultInjector::never(),
        );

        let err = submitter.submit(&mut session, |_| {}).await.unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
        assert!(!session.is_closed());
    }
}
