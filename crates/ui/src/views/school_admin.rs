//! School admin pages: overview, teacher roster and PD assignments.

use dioxus::prelude::*;
use pd_core::filter::{ModuleFilter, TeacherFilter};
use pd_core::model::{PdModule, SchoolId, Teacher, TeacherId, TeacherStatus};

use crate::context::AppContext;
use crate::views::admin::TileGrid;
use crate::views::state::StatusLine;
use crate::views::toast::use_toaster;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AssignForm, AssignmentLabels, AssignmentRowVm, InviteForm, RosterVm, SchoolDashboardVm,
    TeacherRowVm, assign_outcome_label,
};

fn require_school(school_id: Option<SchoolId>) -> Result<SchoolId, ViewError> {
    school_id.ok_or_else(|| ViewError::Failed("no school is linked to this account".into()))
}

#[component]
pub fn SchoolAdminHome() -> Element {
    let ctx = use_context::<AppContext>();
    let dashboard = ctx.dashboard();
    let school_id = ctx.school_id();

    let resource = use_resource(move || {
        let dashboard = dashboard.clone();
        async move {
            let school_id = require_school(school_id)?;
            let overview = dashboard
                .school_overview(school_id)
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(SchoolDashboardVm::from(&overview))
        }
    });

    rsx! {
        div { class: "page",
            match view_state_from_resource(resource) {
                ViewState::Ready(vm) => rsx! {
                    h2 { "{vm.school_name}" }
                    if let Some(notice) = vm.notice {
                        p { class: "notice", "{notice}" }
                    }
                    TileGrid { tiles: vm.tiles }
                },
                ViewState::Error(err) => rsx! { StatusLine { loading: false, error: err } },
                ViewState::Idle | ViewState::Loading => rsx! { StatusLine { loading: true } },
            }
        }
    }
}

//
// ─── ROSTER ────────────────────────────────────────────────────────────────────
//

#[component]
pub fn SchoolTeachers() -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let roster = ctx.roster();
    let school_id = ctx.school_id();
    let mut query = use_signal(String::new);
    let mut form = use_signal(InviteForm::default);
    let mut inviting = use_signal(|| false);

    let mut resource = use_resource(move || {
        let roster = roster.clone();
        let query = query();
        async move {
            let school_id = require_school(school_id)?;
            let filter = TeacherFilter {
                query,
                ..TeacherFilter::default()
            };
            let teachers = roster
                .list(school_id, &filter)
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            let capacity = roster
                .capacity(school_id)
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(RosterVm::new(&teachers, capacity))
        }
    });

    let invite = {
        let roster = ctx.roster();
        move |evt: FormEvent| {
            evt.prevent_default();
            let Some(school_id) = school_id else {
                return;
            };
            let draft = form.read().to_draft();
            let roster = roster.clone();
            inviting.set(true);
            spawn(async move {
                match roster.invite(school_id, draft).await {
                    Ok(teacher) => {
                        toaster.success(format!("Invited {}", teacher.name()));
                        form.set(InviteForm::default());
                        resource.restart();
                    }
                    Err(err) => toaster.error(&err),
                }
                inviting.set(false);
            });
        }
    };

    rsx! {
        div { class: "page",
            h2 { "Teachers" }
            match view_state_from_resource(resource) {
                ViewState::Ready(vm) => rsx! {
                    p { class: "capacity", "{vm.capacity_label}" }
                    if vm.can_invite {
                        form { class: "card form", onsubmit: invite,
                            h3 { "Invite a teacher" }
                            input {
                                placeholder: "Full name",
                                value: "{form.read().name}",
                                oninput: move |evt| form.write().name = evt.value(),
                            }
                            input {
                                r#type: "email",
                                placeholder: "Email",
                                value: "{form.read().email}",
                                oninput: move |evt| form.write().email = evt.value(),
                            }
                            input {
                                placeholder: "Subject (optional)",
                                value: "{form.read().subject}",
                                oninput: move |evt| form.write().subject = evt.value(),
                            }
                            button {
                                class: "primary",
                                r#type: "submit",
                                disabled: inviting() || !form.read().is_complete(),
                                "Send invite"
                            }
                        }
                    } else {
                        p { class: "notice", "No onboarding seats are available." }
                    }
                    input {
                        class: "search",
                        placeholder: "Search teachers",
                        value: "{query}",
                        oninput: move |evt| query.set(evt.value()),
                    }
                    if vm.rows.is_empty() {
                        p { class: "muted", "No teachers yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Name" }
                                    th { "Email" }
                                    th { "Subject" }
                                    th { "Status" }
                                    th {}
                                }
                            }
                            tbody {
                                for row in vm.rows {
                                    TeacherRow { row, on_changed: move |()| resource.restart() }
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

#[component]
fn TeacherRow(row: TeacherRowVm, on_changed: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let id = row.id;

    let set_status = {
        let roster = ctx.roster();
        move |status: TeacherStatus| {
            let roster = roster.clone();
            spawn(async move {
                let result = match status {
                    TeacherStatus::Active => roster.activate(id).await,
                    _ => roster.deactivate(id).await,
                };
                match result {
                    Ok(teacher) => {
                        toaster.success(format!("{} is now {}", teacher.name(), teacher.status().as_str()));
                        on_changed.call(());
                    }
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };
    let activate = set_status.clone();
    let deactivate = set_status;

    rsx! {
        tr {
            td { "{row.name}" }
            td { "{row.email}" }
            td { "{row.subject}" }
            td { "{row.status_label}" }
            td { class: "actions",
                if row.can_activate {
                    button { onclick: move |_| activate(TeacherStatus::Active), "Activate" }
                }
                if row.can_deactivate {
                    button { class: "danger", onclick: move |_| deactivate(TeacherStatus::Inactive), "Deactivate" }
                }
            }
        }
    }
}

//
// ─── ASSIGNMENTS ───────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq)]
struct AssignmentsData {
    modules: Vec<PdModule>,
    teachers: Vec<Teacher>,
    rows: Vec<AssignmentRowVm>,
}

#[component]
pub fn SchoolAssignments() -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let school_id = ctx.school_id();
    let mut form = use_signal(AssignForm::default);

    let mut resource = use_resource({
        let ctx = ctx.clone();
        move || {
            let ctx = ctx.clone();
            async move {
                let school_id = require_school(school_id)?;
                let modules = ctx
                    .catalog()
                    .list(&ModuleFilter::published())
                    .await
                    .map_err(|err| ViewError::from_service(&err))?;
                let roster = ctx
                    .roster()
                    .list(school_id, &TeacherFilter::default())
                    .await
                    .map_err(|err| ViewError::from_service(&err))?;
                let mut assignments = Vec::new();
                for teacher in &roster {
                    assignments.extend(
                        ctx.assignments()
                            .list_for_teacher(teacher.id())
                            .await
                            .map_err(|err| ViewError::from_service(&err))?,
                    );
                }
                let labels = AssignmentLabels::new(&modules, &roster);
                Ok::<_, ViewError>(AssignmentsData {
                    rows: labels.rows(&assignments, ctx.now()),
                    teachers: roster
                        .into_iter()
                        .filter(|t| t.status() == TeacherStatus::Active)
                        .collect(),
                    modules,
                })
            }
        }
    });

    let assign = {
        let assignments = ctx.assignments();
        move |evt: FormEvent| {
            evt.prevent_default();
            let request = match form.read().to_request() {
                Ok(request) => request,
                Err(message) => {
                    toaster.error(&message);
                    return;
                }
            };
            let assignments = assignments.clone();
            spawn(async move {
                match assignments
                    .assign(request.module_id, &request.teacher_ids, request.due_at)
                    .await
                {
                    Ok(outcome) => {
                        toaster.success(assign_outcome_label(&outcome));
                        form.set(AssignForm::default());
                        resource.restart();
                    }
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };

    rsx! {
        div { class: "page",
            h2 { "PD assignments" }
            match view_state_from_resource(resource) {
                ViewState::Ready(data) => rsx! {
                    form { class: "card form", onsubmit: assign,
                        h3 { "Assign a module" }
                        select {
                            value: "{form.read().module}",
                            onchange: move |evt| form.write().module = evt.value(),
                            option { value: "", "Choose a published module" }
                            for module in data.modules {
                                option { value: "{module.id()}", "{module.title()}" }
                            }
                        }
                        fieldset {
                            legend { "Teachers" }
                            if data.teachers.is_empty() {
                                p { class: "muted", "No active teachers." }
                            }
                            for teacher in data.teachers {
                                TeacherCheckbox {
                                    id: teacher.id(),
                                    name: teacher.name().to_owned(),
                                    checked: form.read().teachers.contains(&teacher.id()),
                                    on_toggle: move |id: TeacherId| form.write().toggle_teacher(id),
                                }
                            }
                        }
                        label { "Due date" }
                        input {
                            r#type: "date",
                            value: "{form.read().due}",
                            oninput: move |evt| form.write().due = evt.value(),
                        }
                        button { class: "primary", r#type: "submit", "Assign" }
                    }
                    AssignmentTable { rows: data.rows, show_teacher: true, on_changed: move |()| resource.restart() }
                },
                ViewState::Error(err) => rsx! { StatusLine { loading: false, error: err } },
                ViewState::Idle | ViewState::Loading => rsx! { StatusLine { loading: true } },
            }
        }
    }
}

#[component]
fn TeacherCheckbox(id: TeacherId, name: String, checked: bool, on_toggle: EventHandler<TeacherId>) -> Element {
    rsx! {
        label { class: "checkbox",
            input {
                r#type: "checkbox",
                checked,
                onchange: move |_| on_toggle.call(id),
            }
            "{name}"
        }
    }
}

/// Assignment list shared by the school admin and teacher pages.
#[component]
pub fn AssignmentTable(rows: Vec<AssignmentRowVm>, show_teacher: bool, on_changed: EventHandler<()>) -> Element {
    if rows.is_empty() {
        return rsx! { p { class: "muted", "No assignments yet." } };
    }
    rsx! {
        table { class: "table",
            thead {
                tr {
                    th { "Module" }
                    if show_teacher {
                        th { "Teacher" }
                    }
                    th { "Status" }
                    th { "Due" }
                    th {}
                }
            }
            tbody {
                for row in rows {
                    AssignmentRow { row, show_teacher, on_changed }
                }
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Progress {
    Start,
    Complete,
}

#[component]
fn AssignmentRow(row: AssignmentRowVm, show_teacher: bool, on_changed: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let id = row.id;

    let advance = {
        let assignments = ctx.assignments();
        move |step: Progress| {
            let assignments = assignments.clone();
            spawn(async move {
                let result = match step {
                    Progress::Start => assignments.start(id).await,
                    Progress::Complete => assignments.complete(id).await,
                };
                match result {
                    Ok(_) => on_changed.call(()),
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };
    let start = advance.clone();
    let complete = advance;
    let due_class = if row.overdue { "overdue" } else { "" };

    rsx! {
        tr {
            td { "{row.module_title}" }
            if show_teacher {
                td { "{row.teacher_name}" }
            }
            td { "{row.status_label}" }
            td { class: due_class, "{row.due_label}" }
            td { class: "actions",
                if row.can_start {
                    button { onclick: move |_| start(Progress::Start), "Start" }
                }
                if row.can_complete {
                    button { class: "primary", onclick: move |_| complete(Progress::Complete), "Mark complete" }
                }
            }
        }
    }
}
