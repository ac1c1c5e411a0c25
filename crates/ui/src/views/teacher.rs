//! Teacher pages: overview with the assessment entry point, and assigned learning.

use dioxus::prelude::*;
use dioxus_router::use_navigator;
use pd_core::filter::ModuleFilter;
use pd_core::model::TeacherId;

use crate::context::AppContext;
use crate::views::admin::{MaterialLink, TileGrid};
use crate::views::school_admin::AssignmentTable;
use crate::views::state::StatusLine;
use crate::views::toast::use_toaster;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AssessmentCta, AssignmentLabels, AssignmentRowVm, ModuleCardVm, TeacherDashboardVm,
    entry_route, first_route, map_module_cards,
};

fn require_teacher(teacher_id: Option<TeacherId>) -> Result<TeacherId, ViewError> {
    teacher_id.ok_or_else(|| ViewError::Failed("no teacher is linked to this account".into()))
}

#[component]
pub fn TeacherHome() -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let navigator = use_navigator();
    let dashboard = ctx.dashboard();
    let teacher_id = ctx.teacher_id();
    let mut opening = use_signal(|| false);
    let mut catalog_error = use_signal(|| None::<String>);

    let resource = use_resource(move || {
        let dashboard = dashboard.clone();
        async move {
            let teacher_id = require_teacher(teacher_id)?;
            let overview = dashboard
                .teacher_overview(teacher_id)
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(TeacherDashboardVm::from(&overview))
        }
    });

    let open_assessment = {
        let assessment = ctx.assessment();
        move |cta: AssessmentCta| {
            let Some(teacher_id) = teacher_id else {
                return;
            };
            let assessment = assessment.clone();
            opening.set(true);
            spawn(async move {
                let started = match cta {
                    AssessmentCta::Resume => assessment.resume(teacher_id).await,
                    _ => assessment.start(teacher_id).await,
                };
                match started {
                    Ok(start) => match entry_route(&start) {
                        Ok(route) => {
                            navigator.push(route);
                        }
                        Err(message) => catalog_error.set(Some(message)),
                    },
                    Err(err) => toaster.error(&err),
                }
                opening.set(false);
            });
        }
    };

    let retry = {
        let assessment = ctx.assessment();
        move |_| {
            let assessment = assessment.clone();
            spawn(async move {
                match assessment.retry_catalog().await {
                    Ok(report) => {
                        tracing::info!(loaded = report.loaded, dropped = report.dropped, "catalog reloaded");
                        catalog_error.set(None);
                        let entry = assessment
                            .with_session(|session| {
                                (session.attempt_id(), session.catalog().first_non_empty())
                            })
                            .await;
                        match entry {
                            Ok((attempt, first)) => {
                                navigator.push(first_route(attempt, first));
                            }
                            Err(err) => toaster.error(&err),
                        }
                    }
                    Err(err) => catalog_error.set(Some(err.to_string())),
                }
            });
        }
    };

    rsx! {
        div { class: "page",
            match view_state_from_resource(resource) {
                ViewState::Ready(vm) => rsx! {
                    h2 { "{vm.greeting}" }
                    section { class: "card assessment-cta",
                        h3 { "Competency assessment" }
                        if let Some(message) = catalog_error() {
                            p { class: "error", "Questions could not be loaded: {message}" }
                            button { onclick: retry, "Retry" }
                        } else {
                            button {
                                class: "primary",
                                disabled: opening() || !vm.assessment.is_actionable(),
                                onclick: {
                                    let mut open_assessment = open_assessment.clone();
                                    let cta = vm.assessment;
                                    move |_| open_assessment(cta)
                                },
                                "{vm.assessment.label()}"
                            }
                        }
                    }
                    TileGrid { tiles: vm.tiles }
                },
                ViewState::Error(err) => rsx! { StatusLine { loading: false, error: err } },
                ViewState::Idle | ViewState::Loading => rsx! { StatusLine { loading: true } },
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct LearningData {
    rows: Vec<AssignmentRowVm>,
    modules: Vec<ModuleCardVm>,
}

#[component]
pub fn TeacherLearning() -> Element {
    let ctx = use_context::<AppContext>();
    let teacher_id = ctx.teacher_id();

    let mut resource = use_resource({
        let ctx = ctx.clone();
        move || {
            let ctx = ctx.clone();
            async move {
                let teacher_id = require_teacher(teacher_id)?;
                let assignments = ctx
                    .assignments()
                    .list_for_teacher(teacher_id)
                    .await
                    .map_err(|err| ViewError::from_service(&err))?;
                let mut modules = ctx
                    .catalog()
                    .list(&ModuleFilter::published())
                    .await
                    .map_err(|err| ViewError::from_service(&err))?;
                modules.retain(|m| assignments.iter().any(|a| a.module_id() == m.id()));
                let labels = AssignmentLabels::new(&modules, &[]);
                Ok::<_, ViewError>(LearningData {
                    rows: labels.rows(&assignments, ctx.now()),
                    modules: map_module_cards(&modules),
                })
            }
        }
    });

    rsx! {
        div { class: "page",
            h2 { "My learning" }
            match view_state_from_resource(resource) {
                ViewState::Ready(data) => rsx! {
                    AssignmentTable {
                        rows: data.rows,
                        show_teacher: false,
                        on_changed: move |()| resource.restart(),
                    }
                    for card in data.modules {
                        article { class: "card module",
                            h3 { "{card.title}" }
                            p { class: "muted",
                                "{card.competency} · {card.difficulty_label} · {card.duration_label}"
                            }
                            div { class: "markdown", dangerous_inner_html: "{card.description_html}" }
                            ul { class: "materials",
                                for item in card.materials {
                                    MaterialLink { title: item.title, kind_label: item.kind_label, url: item.url }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! { StatusLine { loading: false, error: err } },
                ViewState::Idle | ViewState::Loading => rsx! { StatusLine { loading: true } },
            }
        }
    }
}
