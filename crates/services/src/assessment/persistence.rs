use std::sync::Arc;

use crate::assessment::session::AssessmentSession;
use crate::content::AssessmentContent;

/// What happened to a best-effort progress save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { answers: usize },
    /// Nothing to do: the attempt is evaluated or the session is closed.
    Skipped,
    Failed(String),
}

impl SaveOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Pushes the full answer set after each question transition.
#[derive(Clone)]
pub struct ProgressSaver {
    content: Arc<dyn AssessmentContent>,
}

impl ProgressSaver {
    #[must_use]
    pub fn new(content: Arc<dyn AssessmentContent>) -> Self {
        Self { content }
    }

    /// Never fails; a failed save is logged and reported in the outcome.
    pub async fn save_after_transition(&self, session: &mut AssessmentSession) -> SaveOutcome {
        if session.is_closed() || session.is_read_only() {
            return SaveOutcome::Skipped;
        }

        let attempt_id = session.attempt_id();
        let answers = session.answers().answers().to_vec();
        match self
            .content
            .save_competency_progress(attempt_id, &answers)
            .await
        {
            Ok(()) => {
                if let Err(err) = session.sync_attempt() {
                    tracing::warn!(attempt = %attempt_id, error = %err, "saved answers could not be mirrored");
                }
                SaveOutcome::Saved {
                    answers: answers.len(),
                }
            }
            Err(err) => {
                tracing::warn!(attempt = %attempt_id, error = %err, "failed to save assessment progress");
                SaveOutcome::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{SimulatedContent, StoredContent};
    use crate::fault::FaultInjector;
    use pd_core::model::{Answer, QuestionId, RawQuestion, TeacherId};
    use pd_core::time::{fixed_clock, fixed_now};
    use storage::repository::Storage;

    async fn setup(faults: FaultInjector) -> (ProgressSaver, AssessmentSession, StoredContent) {
        let storage = Storage::in_memory();
        storage
            .questions
            .replace_questions(&[RawQuestion::new(
                "q1",
                "MCQ",
                "Pick",
                Some(vec!["A".into(), "B".into()]),
            )])
            .await
            .unwrap();
        let stored = StoredContent::new(
            fixed_clock(),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
        );
        let attempt = stored
            .start_competency_attempt(TeacherId::new(3))
            .await
            .unwrap();
        let saver = ProgressSaver::new(Arc::new(SimulatedContent::new(stored.clone(), faults)));
        (saver, AssessmentSession::begin(attempt), stored)
    }

    fn answer() -> Answer {
        Answer::new(QuestionId::new("q1").unwrap(), "A")
    }

    #[tokio::test]
    async fn saves_full_answer_set() {
        let (saver, mut session, stored) = setup(FaultInjector::never()).await;
        session.record(answer()).unwrap();

        let outcome = saver.save_after_transition(&mut session).await;
        assert_eq!(outcome, SaveOutcome::Saved { answers: 1 });
        assert_eq!(session.attempt().answers().len(), 1);

        let persisted = stored
            .get_competency_attempt(TeacherId::new(3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(persisted.answers(), &[answer()]);
    }

    #[tokio::test]
    async fn failure_is_reported_not_raised() {
        let (saver, mut session, _) = setup(FaultInjector::always()).await;
        session.record(answer()).unwrap();

        let outcome = saver.save_after_transition(&mut session).await;
        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert!(session.attempt().answers().is_empty());
        assert_eq!(session.answers().len(), 1);
    }

    #[tokio::test]
    async fn evaluated_and_closed_sessions_are_skipped() {
        let (saver, mut session, _) = setup(FaultInjector::never()).await;
        session.teardown();
        assert_eq!(saver.save_after_transition(&mut session).await, SaveOutcome::Skipped);

        let (saver, session, _) = setup(FaultInjector::never()).await;
        let mut attempt = session.attempt().clone();
        attempt.mark_evaluated(fixed_now()).unwrap();
        let mut evaluated = AssessmentSession::begin(attempt);
        assert_eq!(saver.save_after_transition(&mut evaluated).await, SaveOutcome::Skipped);
    }
}
