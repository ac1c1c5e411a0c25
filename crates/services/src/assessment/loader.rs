use std::sync::Arc;

use pd_core::model::QuestionCatalog;

use crate::assessment::session::{AssessmentSession, CatalogState};
use crate::content::AssessmentContent;
use crate::error::AssessmentError;

/// Counts from one catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
}

/// Fetches and partitions the question list once per attempt.
#[derive(Clone)]
pub struct CatalogLoader {
    content: Arc<dyn AssessmentContent>,
}

impl CatalogLoader {
    #[must_use]
    pub fn new(content: Arc<dyn AssessmentContent>) -> Self {
        Self { content }
    }

    /// Loads the catalog unless it is already populated.
    ///
    /// A failed fetch is logged and leaves the session in
    /// `CatalogState::Failed`; call [`CatalogLoader::retry`] to try again.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` after teardown and `CatalogUnavailable` when the
    /// fetch fails.
    pub async fn ensure_loaded(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<LoadReport, AssessmentError> {
        session.ensure_open()?;
        if session.catalog().is_populated() {
            return Ok(LoadReport {
                loaded: session.catalog().total(),
                dropped: 0,
            });
        }
        if matches!(session.catalog_state(), CatalogState::Failed(_)) {
            return Err(AssessmentError::CatalogUnavailable(
                "previous load failed".to_owned(),
            ));
        }
        self.fetch(session).await
    }

    /// Re-fetches after a failed load.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogLoader::ensure_loaded`].
    pub async fn retry(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<LoadReport, AssessmentError> {
        session.ensure_open()?;
        self.fetch(session).await
    }

    async fn fetch(&self, session: &mut AssessmentSession) -> Result<LoadReport, AssessmentError> {
        let raw = match self.content.get_competency_questions().await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load competency questions");
                let message = err.to_string();
                session.mark_catalog_failed(message.clone());
                return Err(AssessmentError::CatalogUnavailable(message));
            }
        };

        let partitioned = QuestionCatalog::partition(raw);
        for dropped in &partitioned.dropped {
            tracing::warn!(
                question = %dropped.id,
                type_tag = %dropped.type_tag,
                reason = %dropped.reason,
                "dropping competency question"
            );
        }
        let report = LoadReport {
            loaded: partitioned.catalog.total(),
            dropped: partitioned.dropped.len(),
        };
        session.install_catalog(partitioned.catalog);
        tracing::debug!(loaded = report.loaded, dropped = report.dropped, "catalog loaded");
        Ok(report)
    }
}
