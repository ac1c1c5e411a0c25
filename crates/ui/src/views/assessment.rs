//! The competency assessment: one page per section, then submit.

use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use pd_core::model::{AttemptId, Section};
use services::AssessmentService;
use services::assessment::{SectionPage, SubmitProgress};
use tokio::sync::mpsc;

use crate::context::AppContext;
use crate::routes::{Route, SectionSlug};
use crate::views::state::{RedirectTo, StatusLine};
use crate::views::toast::use_toaster;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    QuestionBodyVm, Resolution, SectionPageVm, SubmitVm, media_upload, progress_label, resolve,
    route_after,
};

#[component]
pub fn AssessmentSection(id: AttemptId, section: SectionSlug) -> Element {
    match section {
        SectionSlug::Section(section) => rsx! {
            // Keyed so each section gets a fresh page.
            SectionView { key: "{section}", attempt: id, section }
        },
        SectionSlug::Submit => rsx! { SubmitView { attempt: id } },
    }
}

//
// ─── SECTION PAGE ──────────────────────────────────────────────────────────────
//

/// Renders `page` against the session of `attempt`.
async fn render_page(
    assessment: &AssessmentService,
    attempt: AttemptId,
    page: &SectionPage,
    saving: bool,
) -> Result<SectionPageVm, ViewError> {
    assessment
        .with_attempt(attempt, |session| SectionPageVm::new(page, session, saving))
        .await
        .map_err(|err| ViewError::from_service(&err))
}

#[component]
fn SectionView(attempt: AttemptId, section: Section) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let navigator = use_navigator();
    let mut page = use_signal(|| None::<SectionPage>);
    let mut vm = use_signal(|| None::<SectionPageVm>);
    let mut media_path = use_signal(String::new);

    let resource = use_resource({
        let assessment = ctx.assessment();
        move || {
            let assessment = Arc::clone(&assessment);
            async move {
                let opened = resolve(
                    assessment.open_section(attempt, section).await,
                    Route::TeacherHome {},
                )
                .map_err(|err| ViewError::from_service(&err))?;
                let opened = match opened {
                    Resolution::Ready(opened) => opened,
                    Resolution::RedirectTo(route) => return Ok(Resolution::RedirectTo(route)),
                };
                let rendered = render_page(&assessment, attempt, &opened, false).await?;
                page.set(Some(opened));
                vm.set(Some(rendered));
                Ok::<_, ViewError>(Resolution::Ready(()))
            }
        }
    });

    // Applies a synchronous edit to the page and re-renders it.
    let edit = {
        let assessment = ctx.assessment();
        move |apply: Box<dyn FnOnce(&mut SectionPage)>| {
            let assessment = Arc::clone(&assessment);
            let Some(mut current) = page() else {
                return;
            };
            apply(&mut current);
            spawn(async move {
                match render_page(&assessment, attempt, &current, false).await {
                    Ok(rendered) => vm.set(Some(rendered)),
                    Err(err) => toaster.error(&err.message()),
                }
                page.set(Some(current));
            });
        }
    };

    let next = {
        let assessment = ctx.assessment();
        move |_| {
            let Some(mut current) = page() else {
                return;
            };
            let assessment = Arc::clone(&assessment);
            spawn(async move {
                if let Ok(saving) = render_page(&assessment, attempt, &current, true).await {
                    vm.set(Some(saving));
                }
                let result = assessment.next(attempt, &mut current).await;
                match result {
                    Ok(transition) => {
                        if let Some(route) = route_after(attempt, transition) {
                            navigator.push(route);
                            return;
                        }
                    }
                    Err(err) => toaster.error(&err),
                }
                if let Ok(rendered) = render_page(&assessment, attempt, &current, false).await {
                    vm.set(Some(rendered));
                }
                page.set(Some(current));
            });
        }
    };

    let previous = {
        let assessment = ctx.assessment();
        move |_| {
            let Some(mut current) = page() else {
                return;
            };
            let assessment = Arc::clone(&assessment);
            spawn(async move {
                let moved = assessment
                    .with_attempt(attempt, |session| current.previous(session))
                    .await
                    .unwrap_or(false);
                if moved {
                    if let Ok(rendered) = render_page(&assessment, attempt, &current, false).await {
                        vm.set(Some(rendered));
                    }
                    page.set(Some(current));
                }
            });
        }
    };

    let attach = {
        let assessment = ctx.assessment();
        move |_| {
            let Some(mut current) = page() else {
                return;
            };
            let path = media_path().trim().to_owned();
            let size = match std::fs::metadata(&path) {
                Ok(meta) => meta.len(),
                Err(err) => {
                    toaster.error(&format!("cannot read {path}: {err}"));
                    return;
                }
            };
            let upload = media_upload(&path, size);
            let assessment = Arc::clone(&assessment);
            spawn(async move {
                let selected = assessment
                    .with_attempt(attempt, |session| current.select_media(session, upload))
                    .await;
                match selected {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => toaster.error(&err),
                    Err(err) => toaster.error(&err),
                }
                if let Ok(rendered) = render_page(&assessment, attempt, &current, false).await {
                    vm.set(Some(rendered));
                }
                page.set(Some(current));
            });
        }
    };

    let finish = move |_| {
        let Some(current) = page() else {
            return;
        };
        match current.confirm_complete() {
            Ok(transition) => {
                if let Some(route) = route_after(attempt, transition) {
                    navigator.push(route);
                }
            }
            Err(err) => toaster.error(&err),
        }
    };

    match view_state_from_resource(resource) {
        ViewState::Ready(Resolution::RedirectTo(to)) => return rsx! { RedirectTo { to } },
        ViewState::Error(err) => {
            return rsx! {
                div { class: "page",
                    StatusLine { loading: false, error: err }
                    Link { to: Route::TeacherHome {}, "Back to dashboard" }
                }
            };
        }
        ViewState::Idle | ViewState::Loading => {
            return rsx! {
                div { class: "page",
                    StatusLine { loading: true }
                }
            };
        }
        ViewState::Ready(Resolution::Ready(())) => {}
    }

    let Some(view) = vm() else {
        return rsx! {
            div { class: "page",
                StatusLine { loading: true }
            }
        };
    };

    rsx! {
        div { class: "page assessment",
            h2 { "{view.title}" }
            p { class: "muted", "{view.progress_label}" }
            if let Some(warning) = view.save_warning {
                p { class: "notice", "{warning}" }
            }
            if let Some(done) = view.completion {
                section { class: "card completion",
                    h3 { "Section complete" }
                    p { "{done.message}" }
                    button { class: "primary", onclick: finish, "Review and submit" }
                }
            } else {
                section { class: "card question",
                    p { class: "prompt", "{view.prompt}" }
                    match view.body {
                        Some(QuestionBodyVm::Choice { options }) => rsx! {
                            ul { class: "options",
                                for option in options {
                                    li {
                                        label { class: if option.selected { "option selected" } else { "option" },
                                            input {
                                                r#type: "radio",
                                                name: "choice",
                                                checked: option.selected,
                                                onchange: {
                                                    let edit = edit.clone();
                                                    let index = option.index;
                                                    move |_| edit(Box::new(move |p: &mut SectionPage| p.toggle_option(index)))
                                                },
                                            }
                                            "{option.label}"
                                        }
                                    }
                                }
                            }
                        },
                        Some(QuestionBodyVm::Text { value, counter_label }) => rsx! {
                            textarea {
                                rows: "6",
                                value: "{value}",
                                oninput: {
                                    let edit = edit.clone();
                                    move |evt: FormEvent| {
                                        let text = evt.value();
                                        edit(Box::new(move |p: &mut SectionPage| p.set_text(text)));
                                    }
                                },
                            }
                            p { class: "muted counter", "{counter_label}" }
                        },
                        Some(QuestionBodyVm::Media { hint, selected, stored, locked }) => rsx! {
                            p { class: "muted", "{hint}" }
                            if let Some(stored) = stored {
                                p { "Answer on record: {stored}" }
                            }
                            if locked {
                                p { class: "notice", "This answer is locked." }
                            } else {
                                div { class: "form-row",
                                    input {
                                        placeholder: "Path to recording",
                                        value: "{media_path}",
                                        oninput: move |evt| media_path.set(evt.value()),
                                    }
                                    button { r#type: "button", onclick: attach, "Attach" }
                                }
                                if let Some(selected) = selected {
                                    p { class: "muted", "Selected: {selected}" }
                                }
                            }
                        },
                        None => rsx! {
                            p { class: "muted", "There are no questions in this section." }
                        },
                    }
                    div { class: "actions",
                        button { disabled: !view.can_previous, onclick: previous, "Previous" }
                        button { class: "primary", disabled: !view.can_next, onclick: next, "{view.next_label}" }
                    }
                }
            }
        }
    }
}

//
// ─── SUBMIT ────────────────────────────────────────────────────────────────────
//

#[component]
fn SubmitView(attempt: AttemptId) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let navigator = use_navigator();
    let mut submit_progress = use_signal(|| None::<SubmitProgress>);

    let resource = use_resource({
        let assessment = ctx.assessment();
        move || {
            let assessment = Arc::clone(&assessment);
            async move {
                let review = resolve(assessment.review(attempt).await, Route::TeacherHome {})
                    .map_err(|err| ViewError::from_service(&err))?;
                Ok::<_, ViewError>(match review {
                    Resolution::Ready(review) => Resolution::Ready(SubmitVm::new(attempt, &review)),
                    Resolution::RedirectTo(route) => Resolution::RedirectTo(route),
                })
            }
        }
    });

    let submit = {
        let assessment = ctx.assessment();
        move |_| {
            if submit_progress().is_some_and(|p| !p.is_done()) {
                return;
            }
            let assessment = Arc::clone(&assessment);
            let (tx, mut rx) = mpsc::unbounded_channel();
            spawn(async move {
                while let Some(step) = rx.recv().await {
                    submit_progress.set(Some(step));
                }
            });
            spawn(async move {
                let result = assessment
                    .submit(attempt, move |step| {
                        let _ = tx.send(step);
                    })
                    .await;
                match result {
                    Ok(receipt) => {
                        tracing::info!(attempt = %receipt.attempt_id, answers = receipt.answers, "assessment submitted");
                        toaster.success("Assessment submitted for evaluation");
                        navigator.replace(Route::TeacherHome {});
                    }
                    Err(err) => {
                        submit_progress.set(None);
                        toaster.error(&err);
                    }
                }
            });
        }
    };

    match view_state_from_resource(resource) {
        ViewState::Ready(Resolution::RedirectTo(to)) => rsx! { RedirectTo { to } },
        ViewState::Ready(Resolution::Ready(review)) => rsx! {
            div { class: "page assessment",
                h2 { "Review and submit" }
                ul { class: "list",
                    for row in review.rows {
                        li { class: if row.complete { "section-row complete" } else { "section-row" },
                            Link { to: row.route, "{row.title}" }
                            span { class: "muted", " {row.answered_label}" }
                        }
                    }
                }
                if let Some(blocker) = review.blocker {
                    p { class: "notice", "{blocker}" }
                }
                if let Some(step) = submit_progress() {
                    progress { max: "100", value: "{step.percent()}" }
                    p { class: "muted", "{progress_label(step)}" }
                }
                button {
                    class: "primary",
                    disabled: !review.can_submit || submit_progress().is_some(),
                    onclick: submit,
                    "Submit assessment"
                }
            }
        },
        ViewState::Error(err) => rsx! {
            div { class: "page",
                StatusLine { loading: false, error: err }
            }
        },
        ViewState::Idle | ViewState::Loading => rsx! {
            div { class: "page",
                StatusLine { loading: true }
            }
        },
    }
}
