//! Answer validation rules used to gate "Next" on each section page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("answer needs at least {min} words, got {words}")]
    TooFewWords { words: usize, min: usize },

    #[error("answer is {chars} characters, the limit is {max}")]
    TooLong { chars: usize, max: usize },

    #[error("select an option to continue")]
    NothingSelected,

    #[error("option {index} does not exist ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("file type {mime} is not supported")]
    UnsupportedType { mime: String },

    #[error("file is {size} bytes, the limit is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("file is empty")]
    Empty,
}

//
// ─── SHORT ANSWER ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortAnswerRule {
    pub min_words: usize,
    pub max_chars: usize,
}

impl Default for ShortAnswerRule {
    fn default() -> Self {
        Self {
            min_words: 10,
            max_chars: 2000,
        }
    }
}

impl ShortAnswerRule {
    /// Checks length first, then word count.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TooLong` or `ValidationError::TooFewWords`.
    pub fn validate(&self, text: &str) -> Result<(), ValidationError> {
        let chars = text.chars().count();
        if chars > self.max_chars {
            return Err(ValidationError::TooLong {
                chars,
                max: self.max_chars,
            });
        }
        let words = text.split_whitespace().count();
        if words < self.min_words {
            return Err(ValidationError::TooFewWords {
                words,
                min: self.min_words,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        self.validate(text).is_ok()
    }
}

//
// ─── MCQ ───────────────────────────────────────────────────────────────────────
//

/// Single-choice selection over a question's options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct McqSelection {
    selected: Option<usize>,
}

impl McqSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `index`, or clears the selection if `index` is already selected.
    pub fn toggle(&mut self, index: usize) {
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    /// # Errors
    ///
    /// Returns `ValidationError::OptionOutOfRange` if `index >= option_count`.
    pub fn select(&mut self, index: usize, option_count: usize) -> Result<(), ValidationError> {
        if index >= option_count {
            return Err(ValidationError::OptionOutOfRange {
                index,
                len: option_count,
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.selected.is_some()
    }

    /// The chosen option text.
    ///
    /// # Errors
    ///
    /// Returns `NothingSelected` or `OptionOutOfRange`.
    pub fn resolve<'a>(&self, options: &'a [String]) -> Result<&'a str, ValidationError> {
        let index = self.selected.ok_or(ValidationError::NothingSelected)?;
        options
            .get(index)
            .map(String::as_str)
            .ok_or(ValidationError::OptionOutOfRange {
                index,
                len: options.len(),
            })
    }
}

//
// ─── MEDIA ─────────────────────────────────────────────────────────────────────
//

const MIB: u64 = 1024 * 1024;

/// A recording the teacher picked for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl MediaUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaRule {
    pub accepted_prefix: &'static str,
    pub max_bytes: u64,
}

impl MediaRule {
    /// `audio/*`, up to 10 MiB (10,485,760 bytes). Limits are binary units:
    /// a 10.1 MB recording means 10.1 MiB.
    #[must_use]
    pub fn audio() -> Self {
        Self {
            accepted_prefix: "audio/",
            max_bytes: 10 * MIB,
        }
    }

    /// `video/*`, up to 100 MiB.
    #[must_use]
    pub fn video() -> Self {
        Self {
            accepted_prefix: "video/",
            max_bytes: 100 * MIB,
        }
    }

    /// Type is checked before size.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType`, `Empty` or `TooLarge`.
    pub fn validate(&self, upload: &MediaUpload) -> Result<(), ValidationError> {
        let mime = upload.mime_type.trim().to_ascii_lowercase();
        if !mime.starts_with(self.accepted_prefix) || mime.len() == self.accepted_prefix.len() {
            return Err(ValidationError::UnsupportedType {
                mime: upload.mime_type.clone(),
            });
        }
        if upload.size_bytes == 0 {
            return Err(ValidationError::Empty);
        }
        if upload.size_bytes > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size: upload.size_bytes,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn short_answer_word_boundary() {
        let rule = ShortAnswerRule::default();
        assert_eq!(
            rule.validate(&words(9)).unwrap_err(),
            ValidationError::TooFewWords { words: 9, min: 10 }
        );
        assert!(rule.accepts(&words(10)));
        assert!(rule.accepts(&format!("  {}\n", words(10))));
    }

    #[test]
    fn short_answer_length_checked_first() {
        let rule = ShortAnswerRule::default();
        let long = "a".repeat(2001);
        assert_eq!(
            rule.validate(&long).unwrap_err(),
            ValidationError::TooLong {
                chars: 2001,
                max: 2000
            }
        );

        let many_words = format!("{} ", words(10)).repeat(50);
        assert!(many_words.chars().count() > 2000);
        assert!(matches!(
            rule.validate(&many_words).unwrap_err(),
            ValidationError::TooLong { .. }
        ));
    }

    #[test]
    fn short_answer_counts_chars_not_bytes() {
        let rule = ShortAnswerRule {
            min_words: 1,
            max_chars: 3,
        };
        assert!(rule.accepts("été"));
    }

    #[test]
    fn mcq_toggle_enables_and_disables() {
        let mut sel = McqSelection::new();
        assert!(!sel.is_complete());
        sel.toggle(1);
        assert!(sel.is_complete());
        sel.toggle(2);
        assert_eq!(sel.selected(), Some(2));
        sel.toggle(2);
        assert!(!sel.is_complete());
    }

    #[test]
    fn mcq_select_is_bounds_checked() {
        let mut sel = McqSelection::new();
        assert_eq!(
            sel.select(4, 4).unwrap_err(),
            ValidationError::OptionOutOfRange { index: 4, len: 4 }
        );
        sel.select(3, 4).unwrap();
        let options: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        assert_eq!(sel.resolve(&options).unwrap(), "d");
    }

    #[test]
    fn audio_rule_checks_type_then_size() {
        let rule = MediaRule::audio();
        let too_big = MediaUpload::new("talk.mp3", "audio/mpeg", 10 * MIB + MIB / 10);
        assert!(matches!(
            rule.validate(&too_big).unwrap_err(),
            ValidationError::TooLarge { .. }
        ));

        let pdf = MediaUpload::new("notes.pdf", "application/pdf", 5 * MIB);
        assert!(matches!(
            rule.validate(&pdf).unwrap_err(),
            ValidationError::UnsupportedType { .. }
        ));

        let huge_pdf = MediaUpload::new("notes.pdf", "application/pdf", 500 * MIB);
        assert!(matches!(
            rule.validate(&huge_pdf).unwrap_err(),
            ValidationError::UnsupportedType { .. }
        ));

        let wav = MediaUpload::new("talk.wav", "audio/wav", 5 * MIB);
        assert!(rule.validate(&wav).is_ok());
    }

    #[test]
    fn audio_limit_is_measured_in_binary_units() {
        let rule = MediaRule::audio();
        // 10,100,000 bytes reads as "10.1 MB" in decimal units but is under 10 MiB.
        assert!(rule.validate(&MediaUpload::new("talk.mp3", "audio/mpeg", 10_100_000)).is_ok());
        assert!(
            rule.validate(&MediaUpload::new("talk.mp3", "audio/mpeg", 10_590_000))
                .is_err()
        );
    }

    #[test]
    fn audio_limit_is_ten_mebibytes() {
        let rule = MediaRule::audio();
        assert!(rule.validate(&MediaUpload::new("a", "audio/ogg", 10 * MIB)).is_ok());
        assert!(rule
            .validate(&MediaUpload::new("a", "audio/ogg", 10 * MIB + 1))
            .is_err());
    }

    #[test]
    fn video_rule_and_empty_files() {
        let rule = MediaRule::video();
        assert!(rule.validate(&MediaUpload::new("demo.mp4", "video/mp4", 80 * MIB)).is_ok());
        assert_eq!(
            rule.validate(&MediaUpload::new("demo.mp4", "video/mp4", 0))
                .unwrap_err(),
            ValidationError::Empty
        );
        assert!(matches!(
            rule.validate(&MediaUpload::new("demo.mp3", "audio/mpeg", 1)).unwrap_err(),
            ValidationError::UnsupportedType { .. }
        ));
    }
}
