//! Backends for the competency assessment content service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use pd_core::Clock;
use pd_core::model::{Answer, Attempt, AttemptId, AttemptStatus, QuestionCatalog, RawQuestion, TeacherId};
use storage::repository::{AttemptRepository, QuestionBankRepository};

use crate::error::ContentError;
use crate::fault::FaultInjector;

/// The external collaborator that owns questions and attempts.
#[async_trait]
pub trait AssessmentContent: Send + Sync {
    /// Flat list of competency questions, type tags un-interpreted.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the backend cannot be reached.
    async fn get_competency_questions(&self) -> Result<Vec<RawQuestion>, ContentError>;

    /// The teacher's current attempt, if any.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the backend cannot be reached.
    async fn get_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, ContentError>;

    /// Starts an attempt with pre-grouped questions. An attempt that is already
    /// in progress is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the backend cannot be reached.
    async fn start_competency_attempt(&self, teacher_id: TeacherId)
    -> Result<Attempt, ContentError>;

    /// Replaces the saved answer set of an attempt.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the save fails or the attempt is read-only.
    async fn save_competency_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), ContentError>;
}

#[async_trait]
impl<T: AssessmentContent + ?Sized> AssessmentContent for Arc<T> {
    async fn get_competency_questions(&self) -> Result<Vec<RawQuestion>, ContentError> {
        (**self).get_competency_questions().await
    }

    async fn get_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, ContentError> {
        (**self).get_competency_attempt(teacher_id).await
    }

    async fn start_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Attempt, ContentError> {
        (**self).start_competency_attempt(teacher_id).await
    }

    async fn save_competency_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), ContentError> {
        (**self).save_competency_progress(attempt_id, answers).await
    }
}

//
// ─── STORED ────────────────────────────────────────────────────────────────────
//

/// Content service backed by the local repositories.
#[derive(Clone)]
pub struct StoredContent {
    clock: Clock,
    questions: Arc<dyn QuestionBankRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl StoredContent {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionBankRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            attempts,
        }
    }
}

#[async_trait]
impl AssessmentContent for StoredContent {
    async fn get_competency_questions(&self) -> Result<Vec<RawQuestion>, ContentError> {
        Ok(self.questions.list_questions().await?)
    }

    async fn get_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, ContentError> {
        Ok(self.attempts.latest_attempt_for_teacher(teacher_id).await?)
    }

    async fn start_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Attempt, ContentError> {
        if let Some(existing) = self.attempts.latest_attempt_for_teacher(teacher_id).await? {
            if existing.status() == AttemptStatus::InProgress {
                return Ok(existing);
            }
        }

        let raw = self.questions.list_questions().await?;
        let partitioned = QuestionCatalog::partition(raw);
        if !partitioned.dropped.is_empty() {
            tracing::warn!(
                dropped = partitioned.dropped.len(),
                "question bank contains unsupported questions"
            );
        }
        let attempt = Attempt::start(
            AttemptId::generate(),
            teacher_id,
            partitioned.catalog,
            self.clock.now(),
        );
        self.attempts.upsert_attempt(&attempt).await?;
        Ok(attempt)
    }

    async fn save_competency_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), ContentError> {
        let mut attempt = self
            .attempts
            .get_attempt(attempt_id)
            .await?
            .ok_or(ContentError::AttemptNotFound)?;
        attempt.record_answers(answers)?;
        self.attempts.upsert_attempt(&attempt).await?;
        Ok(())
    }
}

//
// ─── HTTP ──────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct HttpContentConfig {
    pub base_url: String,
    pub token: Option<String>,
}

/// Content service reached over HTTP with JSON bodies.
#[derive(Clone)]
pub struct HttpContent {
    client: Client,
    config: HttpContentConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartAttemptRequest {
    teacher_id: TeacherId,
}

#[derive(Debug, Serialize)]
struct SaveProgressRequest<'a> {
    answers: &'a [Answer],
}

impl HttpContent {
    #[must_use]
    pub fn new(config: HttpContentConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/competency/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response, ContentError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ContentError::Status(response.status()))
        }
    }
}

#[async_trait]
impl AssessmentContent for HttpContent {
    async fn get_competency_questions(&self) -> Result<Vec<RawQuestion>, ContentError> {
        let response = self
            .authorize(self.client.get(self.url("questions")))
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn get_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, ContentError> {
        let response = self
            .authorize(self.client.get(self.url("attempt")))
            .query(&[("teacherId", teacher_id.value())])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Self::check(response)?.json().await?)
    }

    async fn start_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Attempt, ContentError> {
        let response = self
            .authorize(self.client.post(self.url("attempt/start")))
            .json(&StartAttemptRequest { teacher_id })
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn save_competency_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), ContentError> {
        let response = self
            .authorize(
                self.client
                    .put(self.url(&format!("attempt/{attempt_id}/progress"))),
            )
            .json(&SaveProgressRequest { answers })
            .send()
            .await?;
        Self::check(response)?;
        Ok(())
    }
}

//
// ─── SIMULATED ─────────────────────────────────────────────────────────────────
//

/// Wraps a backend and runs every call through a `FaultInjector` first.
#[derive(Clone)]
pub struct SimulatedContent<C> {
    inner: C,
    faults: FaultInjector,
}

impl<C: AssessmentContent> SimulatedContent<C> {
    #[must_use]
    pub fn new(inner: C, faults: FaultInjector) -> Self {
        Self { inner, faults }
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: AssessmentContent> AssessmentContent for SimulatedContent<C> {
    async fn get_competency_questions(&self) -> Result<Vec<RawQuestion>, ContentError> {
        self.faults.run("load questions").await?;
        self.inner.get_competency_questions().await
    }

    async fn get_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, ContentError> {
        self.faults.run("load attempt").await?;
        self.inner.get_competency_attempt(teacher_id).await
    }

    async fn start_competency_attempt(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Attempt, ContentError> {
        self.faults.run("start attempt").await?;
        self.inner.start_competency_attempt(teacher_id).await
    }

    async fn save_competency_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), ContentError> {
        self.faults.run("save progress").await?;
        self.inner.save_competency_progress(attempt_id, answers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::{QuestionId, Section};
    use pd_core::time::fixed_clock;
    use storage::repository::Storage;

    fn bank() -> Vec<RawQuestion> {
        vec![
            RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
            RawQuestion::new("q2", "ESSAY", "Write", None),
            RawQuestion::new("q3", "VIDEO", "Record", None),
        ]
    }

    async fn stored() -> StoredContent {
        let storage = Storage::in_memory();
        storage.questions.replace_questions(&bank()).await.unwrap();
        StoredContent::new(
            fixed_clock(),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
        )
    }

    #[tokio::test]
    async fn start_groups_questions_and_reuses_open_attempt() {
        let content = stored().await;
        let teacher = TeacherId::new(1);

        let first = content.start_competency_attempt(teacher).await.unwrap();
        assert_eq!(first.questions().total(), 2);
        assert_eq!(first.questions().questions(Section::Video).len(), 1);

        let again = content.start_competency_attempt(teacher).await.unwrap();
        assert_eq!(again.id(), first.id());
    }

    #[tokio::test]
    async fn save_progress_replaces_answers() {
        let content = stored().await;
        let attempt = content
            .start_competency_attempt(TeacherId::new(1))
            .await
            .unwrap();
        let answers = vec![Answer::new(QuestionId::new("q1").unwrap(), "A")];
        content
            .save_competency_progress(attempt.id(), &answers)
            .await
            .unwrap();

        let saved = content
            .get_competency_attempt(TeacherId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.answers(), answers.as_slice());
    }

    #[tokio::test]
    async fn save_progress_for_unknown_attempt_fails() {
        let content = stored().await;
        let err = content
            .save_competency_progress(AttemptId::generate(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::AttemptNotFound));
    }

    #[tokio::test]
    async fn simulated_content_surfaces_injected_failures() {
        let content = SimulatedContent::new(stored().await, FaultInjector::always());
        let err = content.get_competency_questions().await.unwrap_err();
        assert!(matches!(err, ContentError::Injected(_)));

        let passthrough = SimulatedContent::new(stored().await, FaultInjector::never());
        assert_eq!(passthrough.get_competency_questions().await.unwrap().len(), 3);
    }

    #[test]
    fn http_urls_are_joined_without_double_slashes() {
        let http = HttpContent::new(HttpContentConfig {
            base_url: "https://content.example.org/api/".into(),
            token: None,
        });
        assert_eq!(
            http.url("attempt/start"),
            "https://content.example.org/api/competency/attempt/start"
        );
    }
}
