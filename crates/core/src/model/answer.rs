use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// A single response to a question. The value is opaque text: the chosen
/// option, the typed answer, or a reference to an uploaded recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub answer: String,
}

impl Answer {
    pub fn new(question_id: QuestionId, answer: impl Into<String>) -> Self {
        Self {
            question_id,
            answer: answer.into(),
        }
    }
}

/// In-memory answers for one attempt.
///
/// Holds at most one entry per question; a later write for the same question
/// replaces the earlier one and moves it to the end of the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: Vec<Answer>,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store from previously saved answers, keeping the last entry
    /// for any repeated question.
    #[must_use]
    pub fn from_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        let mut store = Self::new();
        for answer in answers {
            store.add_answer(answer);
        }
        store
    }

    /// Upserts by question id. No validation happens here.
    pub fn add_answer(&mut self, entry: Answer) {
        self.answers.retain(|a| a.question_id != entry.question_id);
        self.answers.push(entry);
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn get(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| &a.question_id == question_id)
    }

    #[must_use]
    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.get(question_id).is_some()
    }

    /// How many of the given questions have an answer.
    #[must_use]
    pub fn answered_in<'a>(&self, ids: impl IntoIterator<Item = &'a QuestionId>) -> usize {
        ids.into_iter().filter(|id| self.contains(id)).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    #[must_use]
    pub fn into_answers(self) -> Vec<Answer> {
        self.answers
    }
}
