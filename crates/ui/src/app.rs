use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;
use crate::views::Toaster;
use crate::vm::Toast;

#[component]
pub fn App() -> Element {
    let slot = use_signal(|| None::<Toast>);
    use_context_provider(|| Toaster::new(slot));

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        // Per-route headings are rendered inside the content pane.
        document::Title { "PD Dashboard" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
