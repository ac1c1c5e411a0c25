//! Section sequencing for the competency assessment.
//!
//! Sections are walked in [`Section::ORDER`]; empty sections are skipped.

use thiserror::Error;

use crate::model::catalog::QuestionCatalog;
use crate::model::ids::QuestionId;
use crate::model::section::Section;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(QuestionId),
}

/// Where the assessment goes after the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStep {
    pub next_section: Option<Section>,
    pub next_question: Option<QuestionId>,
    pub is_complete: bool,
}

impl NavigationStep {
    fn to(section: Section, question: Option<QuestionId>) -> Self {
        Self {
            next_section: Some(section),
            next_question: question,
            is_complete: false,
        }
    }

    fn complete() -> Self {
        Self {
            next_section: None,
            next_question: None,
            is_complete: true,
        }
    }

    /// True when the next question is in a different section than `current`.
    #[must_use]
    pub fn leaves(&self, current: Section) -> bool {
        self.next_section.is_some_and(|s| s != current)
    }
}

/// A page's own view of where it is inside its section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCursor {
    pub section: Section,
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    catalog: &'a QuestionCatalog,
}

impl<'a> Navigator<'a> {
    #[must_use]
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    /// Decides the step after `current`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::UnknownQuestion` if `current` is not in the catalog.
    pub fn navigate(&self, current: &QuestionId) -> Result<NavigationStep, NavigationError> {
        let (section, index) = self
            .catalog
            .position(current)
            .ok_or_else(|| NavigationError::UnknownQuestion(current.clone()))?;

        if let Some(next) = self.catalog.question(section, index + 1) {
            return Ok(NavigationStep::to(section, Some(next.id().clone())));
        }

        Ok(match self.catalog.first_non_empty_after(section) {
            Some(next_section) => {
                let first = self
                    .catalog
                    .questions(next_section)
                    .first()
                    .map(|q| q.id().clone());
                NavigationStep::to(next_section, first)
            }
            None => NavigationStep::complete(),
        })
    }

    /// Like [`Navigator::navigate`], but when `current` cannot be resolved falls
    /// back to stepping the page's local cursor. Running off the end of the
    /// local list counts as completion.
    #[must_use]
    pub fn advance(&self, current: &QuestionId, cursor: LocalCursor) -> NavigationStep {
        match self.navigate(current) {
            Ok(step) => step,
            Err(_) => {
                let next = cursor.index + 1;
                if next < cursor.len {
                    let id = self
                        .catalog
                        .question(cursor.section, next)
                        .map(|q| q.id().clone());
                    NavigationStep::to(cursor.section, id)
                } else {
                    NavigationStep::complete()
                }
            }
        }
    }

    /// Index of the previous question in the same section, `None` at the start.
    #[must_use]
    pub fn previous(&self, index: usize) -> Option<usize> {
        index.checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::RawQuestion;

    fn raw(id: &str, tag: &str) -> RawQuestion {
        let options = (tag == "MCQ").then(|| vec!["A".to_owned(), "B".to_owned()]);
        RawQuestion::new(id, tag, format!("prompt {id}"), options)
    }

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::partition(vec![
            raw("q1", "MCQ"),
            raw("q2", "MCQ"),
            raw("q3", "SHORT_ANSWER"),
            raw("q4", "VIDEO"),
        ])
        .catalog
    }

    #[test]
    fn navigate_within_and_across_sections() {
        let catalog = catalog();
        let nav = Navigator::new(&catalog);

        let step = nav.navigate(&qid("q1")).unwrap();
        assert_eq!(step.next_section, Some(Section::Mcq));
        assert_eq!(step.next_question, Some(qid("q2")));
        assert!(!step.leaves(Section::Mcq));

        let step = nav.navigate(&qid("q2")).unwrap();
        assert_eq!(step.next_section, Some(Section::ShortAnswer));
        assert_eq!(step.next_question, Some(qid("q3")));

        // audio is empty and skipped
        let step = nav.navigate(&qid("q3")).unwrap();
        assert_eq!(step.next_section, Some(Section::Video));
        assert_eq!(step.next_question, Some(qid("q4")));

        let step = nav.navigate(&qid("q4")).unwrap();
        assert!(step.is_complete);
        assert_eq!(step.next_section, None);
    }

    #[test]
    fn unknown_question_is_an_error() {
        let catalog = catalog();
        let err = Navigator::new(&catalog).navigate(&qid("nope")).unwrap_err();
        assert_eq!(err, NavigationError::UnknownQuestion(qid("nope")));
    }

    #[test]
    fn advance_falls_back_to_local_cursor() {
        let catalog = catalog();
        let nav = Navigator::new(&catalog);

        let cursor = LocalCursor {
            section: Section::Mcq,
            index: 0,
            len: 2,
        };
        let step = nav.advance(&qid("ghost"), cursor);
        assert_eq!(step.next_section, Some(Section::Mcq));
        assert_eq!(step.next_question, Some(qid("q2")));

        let step = nav.advance(&qid("ghost"), LocalCursor { index: 1, ..cursor });
        assert!(step.is_complete);
    }

    #[test]
    fn walk_visits_every_question_once_in_order() {
        let catalog = QuestionCatalog::partition(vec![
            raw("v1", "VIDEO"),
            raw("m1", "MCQ"),
            raw("a1", "AUDIO"),
            raw("m2", "MCQ"),
            raw("a2", "UPLOAD_AUDIO"),
            raw("v2", "VIDEO"),
        ])
        .catalog;
        let nav = Navigator::new(&catalog);

        let mut visited = Vec::new();
        let mut current = catalog.first_question().map(|q| q.id().clone());
        while let Some(id) = current {
            visited.push(id.as_str().to_owned());
            let step = nav.navigate(&id).unwrap();
            if step.is_complete {
                break;
            }
            current = step.next_question;
        }

        assert_eq!(visited, vec!["m1", "m2", "a1", "a2", "v1", "v2"]);
        let expected: Vec<_> = catalog
            .iter_in_order()
            .map(|q| q.id().as_str().to_owned())
            .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn previous_stops_at_zero() {
        let catalog = catalog();
        let nav = Navigator::new(&catalog);
        assert_eq!(nav.previous(2), Some(1));
        assert_eq!(nav.previous(0), None);
    }
}
