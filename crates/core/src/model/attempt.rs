use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::{Answer, AnswerStore};
use crate::model::catalog::QuestionCatalog;
use crate::model::ids::{AttemptId, TeacherId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt has already been evaluated")]
    Finalized,

    #[error("cannot move attempt from {from:?} to {to:?}")]
    InvalidTransition {
        from: AttemptStatus,
        to: AttemptStatus,
    },

    #[error("evaluated_at is before started_at")]
    InvalidTimeRange,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    #[default]
    NotStarted,
    InProgress,
    Evaluated,
}

impl AttemptStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptStatus::NotStarted => "NOT_STARTED",
            AttemptStatus::InProgress => "IN_PROGRESS",
            AttemptStatus::Evaluated => "EVALUATED",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NOT_STARTED" => Some(AttemptStatus::NotStarted),
            "IN_PROGRESS" => Some(AttemptStatus::InProgress),
            "EVALUATED" => Some(AttemptStatus::Evaluated),
            _ => None,
        }
    }
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One teacher's run through the competency assessment.
///
/// Owns its grouped questions and the last saved answer set. Grading is done
/// elsewhere; once an attempt is `Evaluated` it is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    id: AttemptId,
    teacher_id: TeacherId,
    status: AttemptStatus,
    questions: QuestionCatalog,
    answers: Vec<Answer>,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evaluated_at: Option<DateTime<Utc>>,
}

impl Attempt {
    /// Creates an attempt for a teacher who just pressed "start assessment".
    #[must_use]
    pub fn start(
        id: AttemptId,
        teacher_id: TeacherId,
        questions: QuestionCatalog,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            teacher_id,
            status: AttemptStatus::InProgress,
            questions,
            answers: Vec::new(),
            started_at: now,
            evaluated_at: None,
        }
    }

    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTimeRange` if `evaluated_at` precedes `started_at`.
    pub fn from_persisted(
        id: AttemptId,
        teacher_id: TeacherId,
        status: AttemptStatus,
        questions: QuestionCatalog,
        answers: Vec<Answer>,
        started_at: DateTime<Utc>,
        evaluated_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AttemptError> {
        if evaluated_at.is_some_and(|at| at < started_at) {
            return Err(AttemptError::InvalidTimeRange);
        }
        // Deduplicate in case older records carry repeated entries.
        let answers = AnswerStore::from_answers(answers).into_answers();
        Ok(Self {
            id,
            teacher_id,
            status,
            questions,
            answers,
            started_at,
            evaluated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn teacher_id(&self) -> TeacherId {
        self.teacher_id
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionCatalog {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn evaluated_at(&self) -> Option<DateTime<Utc>> {
        self.evaluated_at
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.status == AttemptStatus::Evaluated
    }

    /// Replaces the stored answer set with the given one.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Finalized` once the attempt has been evaluated.
    pub fn record_answers(&mut self, answers: &[Answer]) -> Result<(), AttemptError> {
        if self.is_read_only() {
            return Err(AttemptError::Finalized);
        }
        self.answers = AnswerStore::from_answers(answers.iter().cloned()).into_answers();
        if self.status == AttemptStatus::NotStarted {
            self.status = AttemptStatus::InProgress;
        }
        Ok(())
    }

    /// Marks the attempt as graded.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTransition` unless the attempt is in progress.
    pub fn mark_evaluated(&mut self, now: DateTime<Utc>) -> Result<(), AttemptError> {
        if self.status != AttemptStatus::InProgress {
            return Err(AttemptError::InvalidTransition {
                from: self.status,
                to: AttemptStatus::Evaluated,
            });
        }
        if now < self.started_at {
            return Err(AttemptError::InvalidTimeRange);
        }
        self.status = AttemptStatus::Evaluated;
        self.evaluated_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuestionId;
    use crate::time::fixed_now;

    fn attempt() -> Attempt {
        Attempt::start(
            AttemptId::generate(),
            TeacherId::new(7),
            QuestionCatalog::new(),
            fixed_now(),
        )
    }

    #[test]
    fn start_is_in_progress() {
        let a = attempt();
        assert_eq!(a.status(), AttemptStatus::InProgress);
        assert!(a.answers().is_empty());
    }

    #[test]
    fn evaluated_attempt_is_read_only() {
        let mut a = attempt();
        a.mark_evaluated(fixed_now()).unwrap();
        let err = a
            .record_answers(&[Answer::new(QuestionId::new("q1").unwrap(), "A")])
            .unwrap_err();
        assert_eq!(err, AttemptError::Finalized);
        assert!(a.is_read_only());
    }

    #[test]
    fn cannot_evaluate_twice() {
        let mut a = attempt();
        a.mark_evaluated(fixed_now()).unwrap();
        let err = a.mark_evaluated(fixed_now()).unwrap_err();
        assert!(matches!(err, AttemptError::InvalidTransition { .. }));
    }

    #[test]
    fn record_answers_deduplicates() {
        let mut a = attempt();
        let q1 = QuestionId::new("q1").unwrap();
        a.record_answers(&[Answer::new(q1.clone(), "A"), Answer::new(q1, "B")])
            .unwrap();
        assert_eq!(a.answers().len(), 1);
        assert_eq!(a.answers()[0].answer, "B");
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            AttemptStatus::NotStarted,
            AttemptStatus::InProgress,
            AttemptStatus::Evaluated,
        ] {
            assert_eq!(AttemptStatus::parse(status.as_str()), Some(status));
        }
    }
}
