//! Platform admin pages: overview, school onboarding and the PD catalog.

use dioxus::prelude::*;
use dioxus_router::Link;
use pd_core::filter::{ModuleFilter, SchoolFilter};
use pd_core::model::{Difficulty, SchoolId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::state::{RedirectTo, StatusLine};
use crate::views::toast::use_toaster;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    MaterialForm, ModuleCardVm, ModuleForm, Resolution, SchoolDetailVm, SchoolRowVm, StatTileVm,
    admin_tiles, difficulty_label, map_module_cards, map_school_rows, parse_limit, resolve,
};

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

#[component]
pub fn AdminHome() -> Element {
    let ctx = use_context::<AppContext>();
    let dashboard = ctx.dashboard();

    let resource = use_resource(move || {
        let dashboard = dashboard.clone();
        async move {
            let overview = dashboard
                .admin_overview()
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(admin_tiles(&overview))
        }
    });

    rsx! {
        div { class: "page",
            h2 { "Platform overview" }
            match view_state_from_resource(resource) {
                ViewState::Ready(tiles) => rsx! {
                    TileGrid { tiles }
                    p {
                        Link { to: Route::AdminSchools {}, "Review pending schools" }
                    }
                },
                ViewState::Error(err) => rsx! { StatusLine { loading: false, error: err } },
                ViewState::Idle | ViewState::Loading => rsx! { StatusLine { loading: true } },
            }
        }
    }
}

#[component]
pub fn TileGrid(tiles: Vec<StatTileVm>) -> Element {
    rsx! {
        div { class: "tiles",
            for tile in tiles {
                div { class: "tile",
                    span { class: "tile-value", "{tile.value}" }
                    span { class: "tile-label", "{tile.label}" }
                }
            }
        }
    }
}

//
// ─── SCHOOLS ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq)]
struct SchoolsData {
    pending: Vec<SchoolRowVm>,
    all: Vec<SchoolRowVm>,
}

#[component]
pub fn AdminSchools() -> Element {
    let ctx = use_context::<AppContext>();
    let schools = ctx.schools();
    let mut query = use_signal(String::new);

    let mut resource = use_resource(move || {
        let schools = schools.clone();
        let query = query();
        async move {
            let pending = schools
                .list_pending(&query)
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            let all = schools
                .list(&SchoolFilter {
                    query,
                    status: None,
                })
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(SchoolsData {
                pending: map_school_rows(&pending),
                all: map_school_rows(&all),
            })
        }
    });

    rsx! {
        div { class: "page",
            h2 { "Schools" }
            input {
                class: "search",
                placeholder: "Search by name, city or email",
                value: "{query}",
                oninput: move |evt| query.set(evt.value()),
            }
            match view_state_from_resource(resource) {
                ViewState::Ready(data) => rsx! {
                    h3 { "Pending registrations" }
                    if data.pending.is_empty() {
                        p { class: "muted", "No schools are waiting for review." }
                    } else {
                        ul { class: "list",
                            for row in data.pending {
                                PendingSchool {
                                    row,
                                    on_decided: move |()| resource.restart(),
                                }
                            }
                        }
                    }
                    h3 { "All schools" }
                    table { class: "table",
                        thead {
                            tr {
                                th { "Name" }
                                th { "City" }
                                th { "Status" }
                                th { "Limit" }
                                th { "Registered" }
                            }
                        }
                        tbody {
                            for row in data.all {
                                tr { key: "{row.id}",
                                    td {
                                        Link { to: Route::AdminSchoolDetail { id: row.id }, "{row.name}" }
                                    }
                                    td { "{row.city}" }
                                    td {
                                        span { class: "{row.status_class}", "{row.status_label}" }
                                    }
                                    td { "{row.limit_label}" }
                                    td { "{row.registered_str}" }
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

/// A pending school with its approve and reject forms.
#[component]
fn PendingSchool(row: SchoolRowVm, on_decided: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let mut limit = use_signal(|| "10".to_string());
    let mut reason = use_signal(String::new);
    let mut busy = use_signal(|| false);
    let id = row.id;
    let name = row.name.clone();

    let approve = {
        let schools = ctx.schools();
        let name = name.clone();
        move |_| {
            let limit = match parse_limit(&limit()) {
                Ok(limit) => limit,
                Err(message) => {
                    toaster.error(&message);
                    return;
                }
            };
            let schools = schools.clone();
            let name = name.clone();
            busy.set(true);
            spawn(async move {
                match schools.approve(id, limit).await {
                    Ok(_) => {
                        toaster.success(format!("{name} approved"));
                        on_decided.call(());
                    }
                    Err(err) => toaster.error(&err),
                }
                busy.set(false);
            });
        }
    };

    let reject = {
        let schools = ctx.schools();
        move |_| {
            let schools = schools.clone();
            let name = name.clone();
            let reason = reason();
            busy.set(true);
            spawn(async move {
                match schools.reject(id, reason).await {
                    Ok(_) => {
                        toaster.success(format!("{name} rejected"));
                        on_decided.call(());
                    }
                    Err(err) => toaster.error(&err),
                }
                busy.set(false);
            });
        }
    };

    rsx! {
        li { class: "card",
            div { class: "card-head",
                strong { "{row.name}" }
                span { class: "muted", " · {row.city} · {row.contact_email}" }
            }
            p { class: "muted", "Registered {row.registered_str}" }
            div { class: "form-row",
                label { "Onboarding limit" }
                input {
                    r#type: "number",
                    min: "1",
                    value: "{limit}",
                    oninput: move |evt| limit.set(evt.value()),
                }
                button { class: "primary", disabled: busy(), onclick: approve, "Approve" }
            }
            div { class: "form-row",
                input {
                    placeholder: "Reason for rejection",
                    value: "{reason}",
                    oninput: move |evt| reason.set(evt.value()),
                }
                button {
                    class: "danger",
                    disabled: busy() || reason().trim().is_empty(),
                    onclick: reject,
                    "Reject"
                }
            }
        }
    }
}

#[component]
pub fn AdminSchoolDetail(id: SchoolId) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let schools = ctx.schools();
    let mut limit = use_signal(String::new);

    let mut resource = use_resource(move || {
        let schools = schools.clone();
        async move {
            let resolved = resolve(schools.get(id).await, Route::AdminSchools {})
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(match resolved {
                Resolution::Ready(school) => Resolution::Ready(SchoolDetailVm::from(&school)),
                Resolution::RedirectTo(route) => Resolution::RedirectTo(route),
            })
        }
    });

    let raise = {
        let schools = ctx.schools();
        move |_| {
            let limit = match parse_limit(&limit()) {
                Ok(limit) => limit,
                Err(message) => {
                    toaster.error(&message);
                    return;
                }
            };
            let schools = schools.clone();
            spawn(async move {
                match schools.raise_onboarding_limit(id, limit).await {
                    Ok(_) => {
                        toaster.success("Onboarding limit updated");
                        resource.restart();
                    }
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };

    match view_state_from_resource(resource) {
        ViewState::Ready(Resolution::RedirectTo(to)) => rsx! { RedirectTo { to } },
        ViewState::Ready(Resolution::Ready(detail)) => rsx! {
            div { class: "page",
                p {
                    Link { to: Route::AdminSchools {}, "← Schools" }
                }
                h2 { "{detail.row.name}" }
                dl { class: "details",
                    dt { "City" }
                    dd { "{detail.row.city}" }
                    dt { "Contact" }
                    dd { "{detail.row.contact_email}" }
                    dt { "Status" }
                    dd { "{detail.row.status_label}" }
                    dt { "Onboarding limit" }
                    dd { "{detail.row.limit_label}" }
                    dt { "Registered" }
                    dd { "{detail.row.registered_str}" }
                    if let Some(reason) = detail.rejection_reason {
                        dt { "Rejection reason" }
                        dd { "{reason}" }
                    }
                }
                if detail.can_raise_limit {
                    div { class: "form-row",
                        label { "New limit" }
                        input {
                            r#type: "number",
                            min: "1",
                            value: "{limit}",
                            oninput: move |evt| limit.set(evt.value()),
                        }
                        button { class: "primary", onclick: raise, "Raise limit" }
                    }
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

//
// ─── PD MODULES ────────────────────────────────────────────────────────────────
//

#[component]
pub fn AdminModules() -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let catalog = ctx.catalog();
    let mut form = use_signal(ModuleForm::default);

    let mut resource = use_resource(move || {
        let catalog = catalog.clone();
        async move {
            let modules = catalog
                .list(&ModuleFilter::default())
                .await
                .map_err(|err| ViewError::from_service(&err))?;
            Ok::<_, ViewError>(map_module_cards(&modules))
        }
    });

    let create = {
        let catalog = ctx.catalog();
        move |evt: FormEvent| {
            evt.prevent_default();
            let draft = match form.read().to_draft() {
                Ok(draft) => draft,
                Err(message) => {
                    toaster.error(&message);
                    return;
                }
            };
            let catalog = catalog.clone();
            spawn(async move {
                match catalog.create(draft).await {
                    Ok(module) => {
                        toaster.success(format!("Created \"{}\"", module.title()));
                        form.set(ModuleForm::default());
                        resource.restart();
                    }
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };

    rsx! {
        div { class: "page",
            h2 { "PD modules" }
            form { class: "card form", onsubmit: create,
                h3 { "New module" }
                input {
                    placeholder: "Title",
                    value: "{form.read().title}",
                    oninput: move |evt| form.write().title = evt.value(),
                }
                input {
                    placeholder: "Competency",
                    value: "{form.read().competency}",
                    oninput: move |evt| form.write().competency = evt.value(),
                }
                textarea {
                    placeholder: "Description (Markdown)",
                    value: "{form.read().description}",
                    oninput: move |evt| form.write().description = evt.value(),
                }
                div { class: "form-row",
                    select {
                        value: "{form.read().difficulty}",
                        onchange: move |evt| form.write().difficulty = evt.value(),
                        for difficulty in [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced] {
                            option { value: difficulty.as_str(), "{difficulty_label(difficulty)}" }
                        }
                    }
                    input {
                        r#type: "number",
                        min: "1",
                        value: "{form.read().duration_minutes}",
                        oninput: move |evt| form.write().duration_minutes = evt.value(),
                    }
                    span { class: "muted", "minutes" }
                }
                button { class: "primary", r#type: "submit", "Create module" }
            }
            match view_state_from_resource(resource) {
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        p { class: "muted", "No modules yet." }
                    }
                    for card in cards {
                        ModuleCard {
                            card,
                            on_changed: move |()| resource.restart(),
                        }
                    }
                },
                ViewState::Error(err) => rsx! { StatusLine { loading: false, error: err } },
                ViewState::Idle | ViewState::Loading => rsx! { StatusLine { loading: true } },
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ModuleAction {
    Publish,
    Archive,
}

#[component]
fn ModuleCard(card: ModuleCardVm, on_changed: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let toaster = use_toaster();
    let mut material = use_signal(MaterialForm::default);
    let id = card.id;

    let run = {
        let catalog = ctx.catalog();
        move |action: ModuleAction| {
            let catalog = catalog.clone();
            spawn(async move {
                let result = match action {
                    ModuleAction::Publish => catalog.publish(id).await,
                    ModuleAction::Archive => catalog.archive(id).await,
                };
                match result {
                    Ok(module) => {
                        toaster.success(format!(
                            "\"{}\" is now {}",
                            module.title(),
                            module.status().as_str()
                        ));
                        on_changed.call(());
                    }
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };
    let publish = run.clone();
    let archive = run;

    let add_material = {
        let catalog = ctx.catalog();
        move |evt: FormEvent| {
            evt.prevent_default();
            let new_material = match material.read().to_material() {
                Ok(new_material) => new_material,
                Err(message) => {
                    toaster.error(&message);
                    return;
                }
            };
            let catalog = catalog.clone();
            spawn(async move {
                match catalog.add_material(id, new_material).await {
                    Ok(_) => {
                        material.set(MaterialForm::default());
                        on_changed.call(());
                    }
                    Err(err) => toaster.error(&err),
                }
            });
        }
    };

    rsx! {
        article { class: "card module",
            div { class: "card-head",
                h3 { "{card.title}" }
                span { class: "badge", "{card.status_label}" }
            }
            p { class: "muted",
                "{card.competency} · {card.difficulty_label} · {card.duration_label}"
            }
            div { class: "markdown", dangerous_inner_html: "{card.description_html}" }
            if !card.materials.is_empty() {
                ul { class: "materials",
                    for item in card.materials {
                        MaterialLink { title: item.title, kind_label: item.kind_label, url: item.url }
                    }
                }
            }
            form { class: "form-row", onsubmit: add_material,
                input {
                    placeholder: "Material title",
                    value: "{material.read().title}",
                    oninput: move |evt| material.write().title = evt.value(),
                }
                select {
                    value: "{material.read().kind}",
                    onchange: move |evt| material.write().kind = evt.value(),
                    option { value: "link", "Link" }
                    option { value: "document", "Document" }
                    option { value: "video", "Video" }
                }
                input {
                    placeholder: "https://",
                    value: "{material.read().url}",
                    oninput: move |evt| material.write().url = evt.value(),
                }
                button { r#type: "submit", "Add material" }
            }
            div { class: "actions",
                button {
                    class: "primary",
                    disabled: !card.can_publish,
                    onclick: move |_| publish(ModuleAction::Publish),
                    "Publish"
                }
                button {
                    disabled: !card.can_archive,
                    onclick: move |_| archive(ModuleAction::Archive),
                    "Archive"
                }
            }
        }
    }
}

/// A material row that opens in the system browser.
#[component]
pub fn MaterialLink(title: String, kind_label: &'static str, url: String) -> Element {
    let ctx = use_context::<AppContext>();
    rsx! {
        li {
            span { class: "badge", "{kind_label}" }
            button {
                class: "link",
                r#type: "button",
                onclick: move |_| ctx.open_link(&url),
                "{title}"
            }
        }
    }
}
