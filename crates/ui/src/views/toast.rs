use dioxus::prelude::*;

use crate::vm::{Toast, ToastKind};

/// Shared slot for the toast shown over the current page.
#[derive(Clone, Copy, PartialEq)]
pub struct Toaster(Signal<Option<Toast>>);

impl Toaster {
    #[must_use]
    pub fn new(slot: Signal<Option<Toast>>) -> Self {
        Self(slot)
    }

    pub fn show(mut self, toast: Toast) {
        if toast.kind == ToastKind::Error {
            tracing::warn!(message = %toast.message, "error toast");
        }
        self.0.set(Some(toast));
    }

    pub fn success(self, message: impl Into<String>) {
        self.show(Toast::success(message));
    }

    pub fn error(self, err: &impl std::fmt::Display) {
        self.show(Toast::error(err));
    }

    pub fn dismiss(mut self) {
        self.0.set(None);
    }

    #[must_use]
    pub fn current(&self) -> Option<Toast> {
        self.0.read().clone()
    }
}

/// The toaster provided by `App`.
#[must_use]
pub fn use_toaster() -> Toaster {
    use_context::<Toaster>()
}

#[component]
pub fn ToastHost() -> Element {
    let toaster = use_toaster();
    let Some(toast) = toaster.current() else {
        return rsx! {};
    };
    let class = match toast.kind {
        ToastKind::Success => "toast toast-success",
        ToastKind::Error => "toast toast-error",
    };
    rsx! {
        div { class, role: "status",
            span { "{toast.message}" }
            button {
                class: "toast-close",
                r#type: "button",
                onclick: move |_| toaster.dismiss(),
                "×"
            }
        }
    }
}
