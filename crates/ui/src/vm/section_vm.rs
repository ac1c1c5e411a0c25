//! View model for one assessment section page.

use pd_core::model::{AttemptId, QuestionKind, Section};
use pd_core::validation::{MediaRule, MediaUpload};
use services::assessment::{
    AnswerInput, AssessmentSession, CatalogState, MediaAnswerPolicy, PageState, PageTransition,
    SaveOutcome, SectionPage, SessionStart,
};

use crate::routes::{Route, SectionRoute};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestionBodyVm {
    Choice {
        options: Vec<OptionVm>,
    },
    Text {
        value: String,
        counter_label: String,
    },
    Media {
        hint: String,
        /// File chosen on this visit.
        selected: Option<String>,
        /// Answer already on record for this question.
        stored: Option<String>,
        locked: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionVm {
    pub answered: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionPageVm {
    pub title: &'static str,
    pub progress_label: String,
    pub prompt: String,
    pub body: Option<QuestionBodyVm>,
    pub can_next: bool,
    pub can_previous: bool,
    pub next_label: &'static str,
    pub save_warning: Option<String>,
    pub completion: Option<CompletionVm>,
}

impl SectionPageVm {
    /// `saving` is set by the view while a "Next" press is in flight.
    #[must_use]
    pub fn new(page: &SectionPage, session: &AssessmentSession, saving: bool) -> Self {
        let section = page.section();
        let total = page.question_count(session);
        let question = page.current_question(session);
        let answering = page.state() == PageState::Answering && !saving;

        let completion = (page.state() == PageState::SectionComplete).then(|| {
            let answered = session.answered_in(section);
            CompletionVm {
                answered,
                total,
                message: format!(
                    "You answered {answered} of {total} questions in {}.",
                    section.label()
                ),
            }
        });

        let body = question.map(|question| match question.kind() {
            QuestionKind::Mcq => QuestionBodyVm::Choice {
                options: choice_options(page.input(), question.options()),
            },
            QuestionKind::ShortAnswer => {
                let value = match page.input() {
                    AnswerInput::Text(text) => text.clone(),
                    _ => String::new(),
                };
                let rule = page.short_answer_rule();
                let words = value.split_whitespace().count();
                QuestionBodyVm::Text {
                    counter_label: format!(
                        "{words} / {} words minimum · {} / {} characters",
                        rule.min_words,
                        value.chars().count(),
                        rule.max_chars
                    ),
                    value,
                }
            }
            QuestionKind::Audio | QuestionKind::Video => {
                let stored = page.stored_answer(session).map(|a| a.answer.clone());
                let selected = match page.input() {
                    AnswerInput::Media(Some(upload)) => Some(upload.file_name.clone()),
                    _ => None,
                };
                QuestionBodyVm::Media {
                    hint: media_hint(section),
                    locked: stored.is_some() && page.media_policy() == MediaAnswerPolicy::Locked,
                    selected,
                    stored,
                }
            }
        });

        Self {
            title: section.label(),
            progress_label: if total == 0 {
                "No questions in this section".into()
            } else {
                format!("Question {} of {total}", (page.index() + 1).min(total))
            },
            prompt: question.map(|q| q.prompt().to_owned()).unwrap_or_default(),
            body,
            can_next: answering && page.can_advance(session),
            can_previous: answering && page.index() > 0,
            next_label: if saving { "Saving…" } else { "Next" },
            save_warning: match page.last_save() {
                Some(SaveOutcome::Failed(_)) => Some(
                    "Your progress could not be saved. It will be saved again after your next answer."
                        .into(),
                ),
                _ => None,
            },
            completion,
        }
    }
}

fn choice_options(input: &AnswerInput, options: &[String]) -> Vec<OptionVm> {
    let selected = match input {
        AnswerInput::Choice(selection) => selection.selected(),
        _ => None,
    };
    options
        .iter()
        .enumerate()
        .map(|(index, label)| OptionVm {
            index,
            label: label.clone(),
            selected: selected == Some(index),
        })
        .collect()
}

fn media_hint(section: Section) -> String {
    let (rule, kind) = match section {
        Section::Video => (MediaRule::video(), "a video"),
        _ => (MediaRule::audio(), "an audio"),
    };
    format!(
        "Attach {kind} recording ({}*, up to {} MB).",
        rule.accepted_prefix,
        rule.max_bytes / (1024 * 1024)
    )
}

/// Where the router goes after a successful "Next". `None` keeps the teacher
/// on the current page.
#[must_use]
pub fn route_after(attempt: AttemptId, transition: PageTransition) -> Option<Route> {
    match transition {
        PageTransition::NextQuestion { .. } | PageTransition::SectionComplete { .. } => None,
        PageTransition::NextSection { section } => Some(SectionRoute::new(attempt, section).route()),
        PageTransition::AssessmentComplete => Some(SectionRoute::submit(attempt).route()),
    }
}

/// First page of a freshly opened session. A catalog with no questions at
/// all goes straight to submit.
///
/// # Errors
///
/// Returns the load failure message when the catalog could not be fetched.
pub fn entry_route(start: &SessionStart) -> Result<Route, String> {
    if let CatalogState::Failed(message) = &start.catalog {
        return Err(message.clone());
    }
    Ok(first_route(start.attempt_id, start.first_section))
}

#[must_use]
pub fn first_route(attempt: AttemptId, first_section: Option<Section>) -> Route {
    match first_section {
        Some(section) => SectionRoute::new(attempt, section).route(),
        None => SectionRoute::submit(attempt).route(),
    }
}

/// Builds an upload from a picked file, inferring the MIME type from the
/// extension. Unknown extensions yield `application/octet-stream`, which
/// every media rule rejects.
#[must_use]
pub fn media_upload(file_name: &str, size_bytes: u64) -> MediaUpload {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "webm" => "video/webm",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    };
    let name = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    MediaUpload::new(name, mime, size_bytes)
}
