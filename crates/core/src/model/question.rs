use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ParseIdError, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("invalid question id: {0}")]
    InvalidId(#[from] ParseIdError),

    #[error("unrecognized question type: {0}")]
    UnknownType(String),

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple-choice question needs at least two options, got {0}")]
    MissingOptions(usize),

    #[error("question id appears more than once: {0}")]
    DuplicateId(QuestionId),
}

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// The four response types an assessment question can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    Mcq,
    ShortAnswer,
    Audio,
    Video,
}

impl QuestionKind {
    /// Maps a content-service type tag onto a kind.
    ///
    /// Matching is case-insensitive: `MCQ` or anything mentioning `MULTIPLE` is
    /// multiple choice, `SHORT_ANSWER` is short answer, `AUDIO` and `UPLOAD_AUDIO`
    /// are audio, `VIDEO` is video. Other tags yield `None`.
    #[must_use]
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_uppercase();
        if tag == "MCQ" || tag.contains("MULTIPLE") {
            return Some(Self::Mcq);
        }
        match tag.as_str() {
            "SHORT_ANSWER" => Some(Self::ShortAnswer),
            "AUDIO" | "UPLOAD_AUDIO" => Some(Self::Audio),
            "VIDEO" => Some(Self::Video),
            _ => None,
        }
    }

    /// Canonical tag used when persisting a question.
    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            QuestionKind::Mcq => "MCQ",
            QuestionKind::ShortAnswer => "SHORT_ANSWER",
            QuestionKind::Audio => "AUDIO",
            QuestionKind::Video => "VIDEO",
        }
    }

    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, QuestionKind::Audio | QuestionKind::Video)
    }
}

//
// ─── RAW (WIRE) SHAPE ──────────────────────────────────────────────────────────
//

/// Question as delivered by the assessment-content service, before the type tag
/// has been interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl RawQuestion {
    pub fn new(
        id: impl Into<String>,
        type_tag: impl Into<String>,
        prompt: impl Into<String>,
        options: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            prompt: prompt.into(),
            options,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated assessment question. Immutable once loaded for an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    type_tag: String,
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
}

impl Question {
    /// Builds a question of a known kind.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt and
    /// `QuestionError::MissingOptions` for an MCQ with fewer than two options.
    pub fn new(
        id: QuestionId,
        kind: QuestionKind,
        prompt: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        Self::build(id, kind, kind.as_tag().to_owned(), prompt.into(), options)
    }

    /// Interprets a raw question from the content service.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::UnknownType` when the type tag matches no kind,
    /// plus the validation errors of [`Question::new`].
    pub fn from_raw(raw: RawQuestion) -> Result<Self, QuestionError> {
        let kind = QuestionKind::from_type_tag(&raw.type_tag)
            .ok_or_else(|| QuestionError::UnknownType(raw.type_tag.clone()))?;
        let id = QuestionId::new(raw.id)?;
        Self::build(
            id,
            kind,
            raw.type_tag,
            raw.prompt,
            raw.options.unwrap_or_default(),
        )
    }

    fn build(
        id: QuestionId,
        kind: QuestionKind,
        type_tag: String,
        prompt: String,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.trim().to_owned())
            .filter(|o| !o.is_empty())
            .collect();
        if kind == QuestionKind::Mcq && options.len() < 2 {
            return Err(QuestionError::MissingOptions(options.len()));
        }

        Ok(Self {
            id,
            kind,
            type_tag,
            prompt,
            options,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// The type tag as originally delivered (e.g. `UPLOAD_AUDIO`).
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn to_raw(&self) -> RawQuestion {
        RawQuestion {
            id: self.id.to_string(),
            type_tag: self.type_tag.clone(),
            prompt: self.prompt.clone(),
            options: if self.options.is_empty() {
                None
            } else {
                Some(self.options.clone())
            },
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
