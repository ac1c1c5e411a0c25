//! One assessment section page: a single question at a time with
//! validation-gated "Next".

use pd_core::model::{Answer, Question, QuestionKind, Section};
use pd_core::navigator::{LocalCursor, Navigator};
use pd_core::validation::{McqSelection, MediaRule, MediaUpload, ShortAnswerRule, ValidationError};

use crate::assessment::persistence::{ProgressSaver, SaveOutcome};
use crate::assessment::session::AssessmentSession;
use crate::error::{ContentError, PageError};
use crate::fault::FaultInjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Answering,
    Saving,
    SectionComplete,
}

/// What the teacher has entered for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    Choice(McqSelection),
    Text(String),
    Media(Option<MediaUpload>),
}

impl AnswerInput {
    fn empty_for(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Mcq => AnswerInput::Choice(McqSelection::new()),
            QuestionKind::ShortAnswer => AnswerInput::Text(String::new()),
            QuestionKind::Audio | QuestionKind::Video => AnswerInput::Media(None),
        }
    }
}

/// Whether a stored audio/video answer may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaAnswerPolicy {
    #[default]
    Locked,
    Editable,
}

/// Result of a successful "Next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTransition {
    NextQuestion { index: usize },
    NextSection { section: Section },
    /// The last question of the assessment was answered.
    SectionComplete { answered: usize, total: usize },
    AssessmentComplete,
}

#[derive(Debug, Clone)]
pub struct SectionPage {
    section: Section,
    index: usize,
    state: PageState,
    input: AnswerInput,
    media_policy: MediaAnswerPolicy,
    short_rule: ShortAnswerRule,
    last_save: Option<SaveOutcome>,
}

impl SectionPage {
    #[must_use]
    pub fn new(section: Section) -> Self {
        Self {
            section,
            index: 0,
            state: PageState::Loading,
            input: AnswerInput::empty_for(section.kind()),
            media_policy: MediaAnswerPolicy::default(),
            short_rule: ShortAnswerRule::default(),
            last_save: None,
        }
    }

    #[must_use]
    pub fn with_media_policy(mut self, policy: MediaAnswerPolicy) -> Self {
        self.media_policy = policy;
        self
    }

    #[must_use]
    pub fn with_short_answer_rule(mut self, rule: ShortAnswerRule) -> Self {
        self.short_rule = rule;
        self
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.state
    }

    #[must_use]
    pub fn input(&self) -> &AnswerInput {
        &self.input
    }

    #[must_use]
    pub fn media_policy(&self) -> MediaAnswerPolicy {
        self.media_policy
    }

    #[must_use]
    pub fn short_answer_rule(&self) -> ShortAnswerRule {
        self.short_rule
    }

    /// Outcome of the progress save that followed the last transition.
    #[must_use]
    pub fn last_save(&self) -> Option<&SaveOutcome> {
        self.last_save.as_ref()
    }

    #[must_use]
    pub fn question_count(&self, session: &AssessmentSession) -> usize {
        session.catalog().questions(self.section).len()
    }

    #[must_use]
    pub fn current_question<'a>(&self, session: &'a AssessmentSession) -> Option<&'a Question> {
        session.catalog().question(self.section, self.index)
    }

    #[must_use]
    pub fn stored_answer<'a>(&self, session: &'a AssessmentSession) -> Option<&'a Answer> {
        self.current_question(session)
            .and_then(|q| session.answers().get(q.id()))
    }

    /// Leaves `Loading` once the section has questions to show.
    pub fn refresh(&mut self, session: &AssessmentSession) -> PageState {
        if self.state == PageState::Loading && self.question_count(session) > 0 {
            self.index = self.index.min(self.question_count(session) - 1);
            self.load_input(session);
            self.state = PageState::Answering;
        }
        self.state
    }

    /// Selects an option, or clears it when the same option is chosen again.
    pub fn toggle_option(&mut self, index: usize) {
        match &mut self.input {
            AnswerInput::Choice(selection) => selection.toggle(index),
            other => {
                let mut selection = McqSelection::new();
                selection.toggle(index);
                *other = AnswerInput::Choice(selection);
            }
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.input = AnswerInput::Text(text.into());
    }

    /// Picks a recording for the current question.
    ///
    /// # Errors
    ///
    /// Returns `AnswerLocked` when a stored answer may not be replaced and
    /// `Invalid` when the file fails the section's media rule.
    pub fn select_media(
        &mut self,
        session: &AssessmentSession,
        upload: MediaUpload,
    ) -> Result<(), PageError> {
        if self.media_policy == MediaAnswerPolicy::Locked && self.stored_answer(session).is_some() {
            return Err(PageError::AnswerLocked);
        }
        let rule = media_rule(self.section).ok_or(PageError::NotReady)?;
        if let Err(err) = rule.validate(&upload) {
            self.input = AnswerInput::Media(None);
            return Err(err.into());
        }
        self.input = AnswerInput::Media(Some(upload));
        Ok(())
    }

    /// Whether "Next" is enabled for the current question.
    #[must_use]
    pub fn can_advance(&self, session: &AssessmentSession) -> bool {
        self.state == PageState::Answering && self.answer_value(session).is_ok()
    }

    /// Steps back one question in this section. Returns `false` at the start.
    pub fn previous(&mut self, session: &AssessmentSession) -> bool {
        if self.state != PageState::Answering {
            return false;
        }
        match Navigator::new(session.catalog()).previous(self.index) {
            Some(index) => {
                self.index = index;
                self.load_input(session);
                true
            }
            None => false,
        }
    }

    /// Validates, uploads, records and moves on.
    ///
    /// # Errors
    ///
    /// - `Busy` while a save is in flight and `NotReady` outside `Answering`.
    /// - `Invalid` or `AnswerLocked` when the current input does not pass.
    /// - `Network` when the upload fails; the page goes back to `Answering`
    ///   and nothing is recorded.
    /// - `Session` after teardown.
    pub async fn next(
        &mut self,
        session: &mut AssessmentSession,
        saver: &ProgressSaver,
        faults: &FaultInjector,
    ) -> Result<PageTransition, PageError> {
        session.ensure_open()?;
        match self.state {
            PageState::Saving => return Err(PageError::Busy),
            PageState::Loading | PageState::SectionComplete => return Err(PageError::NotReady),
            PageState::Answering => {}
        }

        let question_id = self
            .current_question(session)
            .map(|q| q.id().clone())
            .ok_or(PageError::NotReady)?;
        let value = self.answer_value(session)?;

        self.state = PageState::Saving;
        if !self.reuses_stored_media(session) {
            if let Err(err) = faults.run("upload answer").await {
                self.state = PageState::Answering;
                return Err(PageError::Network(ContentError::from(err)));
            }
        }
        if let Err(err) = session.record(Answer::new(question_id.clone(), value)) {
            self.state = PageState::Answering;
            return Err(err.into());
        }

        let total = self.question_count(session);
        let step = Navigator::new(session.catalog()).advance(
            &question_id,
            LocalCursor {
                section: self.section,
                index: self.index,
                len: total,
            },
        );
        tracing::debug!(
            section = %self.section,
            question = %question_id,
            next = ?step.next_question,
            complete = step.is_complete,
            "assessment navigation"
        );
        self.last_save = Some(saver.save_after_transition(session).await);

        if step.is_complete {
            self.state = PageState::SectionComplete;
            return Ok(PageTransition::SectionComplete {
                answered: session.answered_in(self.section),
                total,
            });
        }
        if let Some(section) = step.next_section.filter(|_| step.leaves(self.section)) {
            self.state = PageState::SectionComplete;
            return Ok(PageTransition::NextSection { section });
        }

        self.index = step
            .next_question
            .as_ref()
            .and_then(|id| session.catalog().position(id))
            .map_or(self.index + 1, |(_, index)| index);
        self.load_input(session);
        self.state = PageState::Answering;
        Ok(PageTransition::NextQuestion { index: self.index })
    }

    /// Acknowledges the completion summary.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` unless the page has reached `SectionComplete`.
    pub fn confirm_complete(&self) -> Result<PageTransition, PageError> {
        if self.state == PageState::SectionComplete {
            Ok(PageTransition::AssessmentComplete)
        } else {
            Err(PageError::NotReady)
        }
    }

    fn answer_value(&self, session: &AssessmentSession) -> Result<String, PageError> {
        let question = self.current_question(session).ok_or(PageError::NotReady)?;
        match (&self.input, question.kind()) {
            (AnswerInput::Choice(selection), QuestionKind::Mcq) => {
                Ok(selection.resolve(question.options())?.to_owned())
            }
            (AnswerInput::Text(text), QuestionKind::ShortAnswer) => {
                self.short_rule.validate(text)?;
                Ok(text.trim().to_owned())
            }
            (AnswerInput::Media(upload), QuestionKind::Audio | QuestionKind::Video) => {
                let stored = self.stored_answer(session);
                match (upload, stored) {
                    (_, Some(stored)) if self.media_policy == MediaAnswerPolicy::Locked => {
                        Ok(stored.answer.clone())
                    }
                    (Some(upload), _) => {
                        let rule = media_rule(self.section).ok_or(PageError::NotReady)?;
                        rule.validate(upload)?;
                        Ok(upload.file_name.clone())
                    }
                    (None, Some(stored)) => Ok(stored.answer.clone()),
                    (None, None) => Err(ValidationError::Empty.into()),
                }
            }
            (_, QuestionKind::Mcq) => Err(ValidationError::NothingSelected.into()),
            _ => Err(PageError::NotReady),
        }
    }

    /// A media answer already on record that "Next" keeps without uploading.
    fn reuses_stored_media(&self, session: &AssessmentSession) -> bool {
        let AnswerInput::Media(upload) = &self.input else {
            return false;
        };
        self.stored_answer(session).is_some()
            && (self.media_policy == MediaAnswerPolicy::Locked || upload.is_none())
    }

    fn load_input(&mut self, session: &AssessmentSession) {
        let Some(question) = self.current_question(session) else {
            self.input = AnswerInput::empty_for(self.section.kind());
            return;
        };
        let stored = session.answers().get(question.id()).map(|a| a.answer.as_str());
        self.input = match question.kind() {
            QuestionKind::Mcq => {
                let mut selection = McqSelection::new();
                if let Some(index) =
                    stored.and_then(|s| question.options().iter().position(|o| o == s))
                {
                    selection.toggle(index);
                }
                AnswerInput::Choice(selection)
            }
            QuestionKind::ShortAnswer => AnswerInput::Text(stored.unwrap_or_default().to_owned()),
            QuestionKind::Audio | QuestionKind::Video => AnswerInput::Media(None),
        };
    }
}

fn media_rule(section: Section) -> Option<MediaRule> {
    match section {
        Section::Audio => Some(MediaRule::audio()),
        Section::Video => Some(MediaRule::video()),
        Section::Mcq | Section::ShortAnswer => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::content::{AssessmentContent, SimulatedContent, StoredContent};
    use pd_core::model::{Attempt, AttemptId, QuestionCatalog, QuestionId, RawQuestion, TeacherId};
    use pd_core::time::{fixed_clock, fixed_now};
    use storage::repository::Storage;

    const TEN_WORDS: &str = "one two three four five six seven eight nine ten";

    fn bank() -> Vec<RawQuestion> {
        vec![
            RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
            RawQuestion::new("q2", "MCQ", "Pick again", Some(vec!["C".into(), "D".into()])),
            RawQuestion::new("q3", "SHORT_ANSWER", "Explain", None),
            RawQuestion::new("q4", "UPLOAD_AUDIO", "Say", None),
        ]
    }

    fn session() -> AssessmentSession {
        AssessmentSession::begin(Attempt::start(
            AttemptId::generate(),
            TeacherId::new(1),
            QuestionCatalog::partition(bank()).catalog,
            fixed_now(),
        ))
    }

    fn saver() -> ProgressSaver {
        let storage = Storage::in_memory();
        let content: Arc<dyn AssessmentContent> = Arc::new(SimulatedContent::new(
            StoredContent::new(
                fixed_clock(),
                Arc::clone(&storage.questions),
                Arc::clone(&storage.attempts),
            ),
            FaultInjector::never(),
        ));
        ProgressSaver::new(content)
    }

    fn open(section: Section, session: &AssessmentSession) -> SectionPage {
        let mut page = SectionPage::new(section);
        assert_eq!(page.refresh(session), PageState::Answering);
        page
    }

    #[test]
    fn stays_loading_while_section_is_empty() {
        let session = session();
        let mut page = SectionPage::new(Section::Video);
        assert_eq!(page.refresh(&session), PageState::Loading);
        assert!(!page.can_advance(&session));
    }

    #[test]
    fn mcq_next_follows_selection() {
        let session = session();
        let mut page = open(Section::Mcq, &session);
        assert!(!page.can_advance(&session));

        page.toggle_option(1);
        assert!(page.can_advance(&session));

        page.toggle_option(1);
        assert!(!page.can_advance(&session));
    }

    #[test]
    fn short_answer_next_follows_word_count() {
        let session = session();
        let mut page = open(Section::ShortAnswer, &session);

        page.set_text("one two three four five six seven eight nine");
        assert!(!page.can_advance(&session));
        page.set_text(TEN_WORDS);
        assert!(page.can_advance(&session));
    }

    #[tokio::test]
    async fn mcq_walks_questions_then_leaves_section() {
        let mut session = session();
        let saver = saver();
        let mut page = open(Section::Mcq, &session);

        page.toggle_option(0);
        let step = page
            .next(&mut session, &saver, &FaultInjector::never())
            .await
            .unwrap();
        assert_eq!(step, PageTransition::NextQuestion { index: 1 });
        assert!(!page.can_advance(&session));

        page.toggle_option(1);
        let step = page
            .next(&mut session, &saver, &FaultInjector::never())
            .await
            .unwrap();
        assert_eq!(
            step,
            PageTransition::NextSection {
                section: Section::ShortAnswer
            }
        );
        assert_eq!(session.answered_in(Section::Mcq), 2);
    }

    #[tokio::test]
    async fn previous_restores_stored_choice() {
        let mut session = session();
        let mut page = open(Section::Mcq, &session);
        page.toggle_option(1);
        page.next(&mut session, &saver(), &FaultInjector::never())
            .await
            .unwrap();

        assert!(page.previous(&session));
        assert_eq!(page.index(), 0);
        let mut expected = McqSelection::new();
        expected.toggle(1);
        assert_eq!(page.input(), &AnswerInput::Choice(expected));
        assert!(!page.previous(&session));
    }

    #[tokio::test]
    async fn network_failure_keeps_page_answering_and_records_nothing() {
        let mut session = session();
        let mut page = open(Section::Mcq, &session);
        page.toggle_option(0);

        let err = page
            .next(&mut session, &saver(), &FaultInjector::always())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Network(_)));
        assert_eq!(page.state(), PageState::Answering);
        assert!(session.answers().is_empty());
    }

    #[tokio::test]
    async fn next_is_rejected_while_saving() {
        let mut session = session();
        let mut page = open(Section::Mcq, &session);
        page.toggle_option(0);
        page.state = PageState::Saving;

        let err = page
            .next(&mut session, &saver(), &FaultInjector::never())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Busy));
    }

    #[tokio::test]
    async fn last_question_reports_completion_summary() {
        let mut session = session();
        let saver = saver();
        let mut page = open(Section::Audio, &session);
        assert!(page.confirm_complete().is_err());

        page.select_media(&session, MediaUpload::new("answer.wav", "audio/wav", 5 * 1024 * 1024))
            .unwrap();
        let step = page
            .next(&mut session, &saver, &FaultInjector::never())
            .await
            .unwrap();
        assert_eq!(step, PageTransition::SectionComplete { answered: 1, total: 1 });
        assert_eq!(page.state(), PageState::SectionComplete);
        assert_eq!(page.confirm_complete().unwrap(), PageTransition::AssessmentComplete);
        // The attempt was never persisted, so the best-effort save fails quietly.
        assert!(matches!(page.last_save(), Some(SaveOutcome::Failed(_))));
    }

    #[test]
    fn invalid_media_is_rejected_on_selection() {
        let session = session();
        let mut page = open(Section::Audio, &session);

        let err = page
            .select_media(&session, MediaUpload::new("notes.pdf", "application/pdf", 5 * 1024 * 1024))
            .unwrap_err();
        assert!(matches!(
            err,
            PageError::Invalid(ValidationError::UnsupportedType { .. })
        ));
        assert!(!page.can_advance(&session));
    }

    #[test]
    fn stored_media_answer_is_locked_but_allows_next() {
        let mut session = session();
        session
            .record(Answer::new(QuestionId::new("q4").unwrap(), "first.wav"))
            .unwrap();
        let mut page = open(Section::Audio, &session);
        assert!(page.can_advance(&session));

        let err = page
            .select_media(&session, MediaUpload::new("second.wav", "audio/wav", 1024))
            .unwrap_err();
        assert!(matches!(err, PageError::AnswerLocked));

        let mut editable = SectionPage::new(Section::Audio).with_media_policy(MediaAnswerPolicy::Editable);
        editable.refresh(&session);
        editable
            .select_media(&session, MediaUpload::new("second.wav", "audio/wav", 1024))
            .unwrap();
        assert!(editable.can_advance(&session));
    }

    #[tokio::test]
    async fn locked_media_answer_advances_without_uploading() {
        let mut session = session();
        session
            .record(Answer::new(QuestionId::new("q4").unwrap(), "first.wav"))
            .unwrap();
        let mut page = open(Section::Audio, &session);

        let step = page
            .next(&mut session, &saver(), &FaultInjector::always())
            .await
            .unwrap();
        assert_eq!(step, PageTransition::SectionComplete { answered: 1, total: 1 });
        assert_eq!(
            session.answers().get(&QuestionId::new("q4").unwrap()).map(|a| a.answer.as_str()),
            Some("first.wav")
        );

        let mut editable = SectionPage::new(Section::Audio).with_media_policy(MediaAnswerPolicy::Editable);
        editable.refresh(&session);
        editable
            .select_media(&session, MediaUpload::new("second.wav", "audio/wav", 1024))
            .unwrap();
        let err = editable
            .next(&mut session, &saver(), &FaultInjector::always())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Network(_)));
    }

    #[tokio::test]
    async fn closed_session_rejects_next() {
        let mut session = session();
        let mut page = open(Section::Mcq, &session);
        page.toggle_option(0);
        session.teardown();

        let err = page
            .next(&mut session, &saver(), &FaultInjector::never())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Session(_)));
    }
}
