use pd_core::model::AttemptId;
use services::SubmitReview;
use services::assessment::SubmitProgress;

use crate::routes::{Route, SectionRoute};

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRowVm {
    pub title: &'static str,
    pub answered_label: String,
    pub complete: bool,
    pub route: Route,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitVm {
    pub rows: Vec<SubmitRowVm>,
    pub can_submit: bool,
    pub blocker: Option<String>,
}

impl SubmitVm {
    #[must_use]
    pub fn new(attempt: AttemptId, review: &SubmitReview) -> Self {
        let rows = review
            .sections()
            .iter()
            .map(|status| SubmitRowVm {
                title: status.section.label(),
                answered_label: if status.total == 0 {
                    "No questions".into()
                } else {
                    format!("{} of {} answered", status.answered, status.total)
                },
                complete: status.is_complete(),
                route: SectionRoute::new(attempt, status.section).route(),
            })
            .collect();

        let incomplete = review.incomplete();
        let blocker = (!incomplete.is_empty()).then(|| {
            let names: Vec<_> = incomplete.iter().map(|s| s.label()).collect();
            format!("Finish {} before submitting.", names.join(", "))
        });

        Self {
            rows,
            can_submit: review.can_submit(),
            blocker,
        }
    }
}

#[must_use]
pub fn progress_label(progress: SubmitProgress) -> String {
    if progress.is_done() {
        "Submitted".into()
    } else {
        format!("Submitting… {}%", progress.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::{Answer, Attempt, QuestionCatalog, QuestionId, RawQuestion, TeacherId};
    use pd_core::time::fixed_now;
    use services::assessment::AssessmentSession;

    #[test]
    fn review_lists_incomplete_sections() {
        let partitioned = QuestionCatalog::partition(vec![
            RawQuestion::new("q1", "MCQ", "Pick", Some(vec!["A".into(), "B".into()])),
            RawQuestion::new("q2", "SHORT_ANSWER", "Explain", None),
        ]);
        let attempt_id = AttemptId::generate();
        let attempt = Attempt::start(attempt_id, TeacherId::new(1), partitioned.catalog, fixed_now());
        let mut session = AssessmentSession::begin(attempt);
        session
            .record(Answer::new(QuestionId::new("q1").unwrap(), "A"))
            .unwrap();

        let vm = SubmitVm::new(attempt_id, &SubmitReview::from_session(&session));
        assert!(!vm.can_submit);
        assert_eq!(vm.blocker.as_deref(), Some("Finish Short Answer before submitting."));
        assert_eq!(vm.rows[0].answered_label, "1 of 1 answered");
        assert!(vm.rows[0].complete);
        assert_eq!(vm.rows[2].answered_label, "No questions");
        assert!(vm.rows[2].complete);
    }
}
