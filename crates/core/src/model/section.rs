use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::question::QuestionKind;

/// One step of the competency assessment. Sections are always presented in
/// [`Section::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    Mcq,
    ShortAnswer,
    Audio,
    Video,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Section::Mcq,
        Section::ShortAnswer,
        Section::Audio,
        Section::Video,
    ];

    #[must_use]
    pub fn position(self) -> usize {
        match self {
            Section::Mcq => 0,
            Section::ShortAnswer => 1,
            Section::Audio => 2,
            Section::Video => 3,
        }
    }

    /// Sections that come after this one, in order.
    pub fn following(self) -> impl Iterator<Item = Section> {
        Self::ORDER.into_iter().skip(self.position() + 1)
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self.position() + 1 == Self::ORDER.len()
    }

    /// Path segment used by the teacher dashboard routes.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Section::Mcq => "mcqs",
            Section::ShortAnswer => "short-answer",
            Section::Audio => "audio",
            Section::Video => "video",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|s| s.slug() == slug)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Section::Mcq => "Multiple Choice",
            Section::ShortAnswer => "Short Answer",
            Section::Audio => "Audio Response",
            Section::Video => "Video Response",
        }
    }

    #[must_use]
    pub fn kind(self) -> QuestionKind {
        match self {
            Section::Mcq => QuestionKind::Mcq,
            Section::ShortAnswer => QuestionKind::ShortAnswer,
            Section::Audio => QuestionKind::Audio,
            Section::Video => QuestionKind::Video,
        }
    }
}

impl From<QuestionKind> for Section {
    fn from(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Mcq => Section::Mcq,
            QuestionKind::ShortAnswer => Section::ShortAnswer,
            QuestionKind::Audio => Section::Audio,
            QuestionKind::Video => Section::Video,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_respects_fixed_order() {
        let after_mcq: Vec<_> = Section::Mcq.following().collect();
        assert_eq!(
            after_mcq,
            vec![Section::ShortAnswer, Section::Audio, Section::Video]
        );
        assert_eq!(Section::Video.following().count(), 0);
        assert!(Section::Video.is_last());
    }

    #[test]
    fn slugs_round_trip() {
        for section in Section::ORDER {
            assert_eq!(Section::from_slug(section.slug()), Some(section));
        }
        assert_eq!(Section::from_slug("submit"), None);
    }

    #[test]
    fn ordering_matches_order_array() {
        let mut sorted = Section::ORDER;
        sorted.sort();
        assert_eq!(sorted, Section::ORDER);
    }
}
