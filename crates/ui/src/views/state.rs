use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::routes::Route;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    /// A service error whose message is safe to show.
    Failed(String),
}

impl ViewError {
    #[must_use]
    pub fn from_service(err: &impl std::fmt::Display) -> Self {
        ViewError::Failed(err.to_string())
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ViewError::Unknown => "Something went wrong. Please try again.".into(),
            ViewError::Failed(message) => message.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Replaces the current route once mounted.
#[component]
pub fn RedirectTo(to: Route) -> Element {
    let navigator = use_navigator();
    use_effect(move || {
        navigator.replace(to.clone());
    });
    rsx! {
        p { class: "muted", "Redirecting…" }
    }
}

/// Loading/error placeholder shared by every page.
#[component]
pub fn StatusLine(loading: bool, error: Option<ViewError>) -> Element {
    if loading {
        return rsx! { p { class: "muted", "Loading..." } };
    }
    match error {
        Some(err) => rsx! { p { class: "error", "{err.message()}" } },
        None => rsx! {},
    }
}
