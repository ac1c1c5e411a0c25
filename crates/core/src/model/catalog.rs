use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionError, RawQuestion};
use crate::model::section::Section;

/// A question that could not be placed into any section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedQuestion {
    pub id: String,
    pub type_tag: String,
    pub reason: QuestionError,
}

/// Output of [`QuestionCatalog::partition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioned {
    pub catalog: QuestionCatalog,
    pub dropped: Vec<DroppedQuestion>,
}

/// Questions of one attempt grouped by section, each group kept in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCatalog {
    groups: BTreeMap<Section, Vec<Question>>,
}

impl QuestionCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a flat question list into the four sections.
    ///
    /// Questions whose type tag is not recognized (or that fail validation) are
    /// left out and reported in `dropped`; partitioning itself never fails.
    #[must_use]
    pub fn partition(raw: impl IntoIterator<Item = RawQuestion>) -> Partitioned {
        let mut catalog = Self::new();
        let mut dropped = Vec::new();

        for item in raw {
            let id = item.id.clone();
            let type_tag = item.type_tag.clone();
            match Question::from_raw(item) {
                Ok(question) => {
                    if catalog.contains(question.id()) {
                        dropped.push(DroppedQuestion {
                            id,
                            type_tag,
                            reason: QuestionError::DuplicateId(question.id().clone()),
                        });
                        continue;
                    }
                    catalog.push(question);
                }
                Err(reason) => dropped.push(DroppedQuestion {
                    id,
                    type_tag,
                    reason,
                }),
            }
        }

        Partitioned { catalog, dropped }
    }

    /// Builds a catalog from questions that are already grouped (e.g. an attempt
    /// returned by the content service). The section of each question is taken
    /// from its kind, not from the map key.
    #[must_use]
    pub fn from_grouped(grouped: BTreeMap<Section, Vec<Question>>) -> Self {
        let mut catalog = Self::new();
        for question in grouped.into_values().flatten() {
            if !catalog.contains(question.id()) {
                catalog.push(question);
            }
        }
        catalog
    }

    fn push(&mut self, question: Question) {
        self.groups
            .entry(Section::from(question.kind()))
            .or_default()
            .push(question);
    }

    #[must_use]
    pub fn questions(&self, section: Section) -> &[Question] {
        self.groups.get(&section).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn question(&self, section: Section, index: usize) -> Option<&Question> {
        self.questions(section).get(index)
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.groups.values().any(|g| !g.is_empty())
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.position(id).is_some()
    }

    /// Section and index of a question within its section.
    #[must_use]
    pub fn position(&self, id: &QuestionId) -> Option<(Section, usize)> {
        Section::ORDER.into_iter().find_map(|section| {
            self.questions(section)
                .iter()
                .position(|q| q.id() == id)
                .map(|idx| (section, idx))
        })
    }

    /// The first section after `section` that has at least one question.
    #[must_use]
    pub fn first_non_empty_after(&self, section: Section) -> Option<Section> {
        section
            .following()
            .find(|s| !self.questions(*s).is_empty())
    }

    #[must_use]
    pub fn first_non_empty(&self) -> Option<Section> {
        Section::ORDER
            .into_iter()
            .find(|s| !self.questions(*s).is_empty())
    }

    #[must_use]
    pub fn first_question(&self) -> Option<&Question> {
        self.first_non_empty()
            .and_then(|section| self.questions(section).first())
    }

    /// All questions in section order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &Question> {
        Section::ORDER
            .into_iter()
            .flat_map(move |section| self.questions(section).iter())
    }

    /// Ids of the questions in one section.
    pub fn ids(&self, section: Section) -> impl Iterator<Item = &QuestionId> {
        self.questions(section).iter().map(Question::id)
    }

    #[must_use]
    pub fn grouped(&self) -> &BTreeMap<Section, Vec<Question>> {
        &self.groups
    }
}
