use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, use_route};

use crate::context::{AppContext, Role};
use crate::routes::Route;
use crate::views::state::RedirectTo;
use crate::views::toast::ToastHost;

/// Sidebar plus content pane. Routes outside the signed-in role's scope
/// are redirected to that role's dashboard.
#[component]
pub fn Shell() -> Element {
    let ctx = use_context::<AppContext>();
    let route = use_route::<Route>();
    let role = ctx.role();

    if let Some(to) = route.redirect_for(role) {
        return rsx! { RedirectTo { to } };
    }

    rsx! {
        div { class: "shell",
            nav { class: "sidebar",
                p { class: "sidebar-role", "{role.label()}" }
                ul {
                    for (label, to) in nav_items(role) {
                        li {
                            Link { class: "nav-link", active_class: "active", to, "{label}" }
                        }
                    }
                }
            }
            main { class: "content",
                ToastHost {}
                Outlet::<Route> {}
            }
        }
    }
}

fn nav_items(role: Role) -> Vec<(&'static str, Route)> {
    match role {
        Role::Admin => vec![
            ("Overview", Route::AdminHome {}),
            ("Schools", Route::AdminSchools {}),
            ("PD Modules", Route::AdminModules {}),
        ],
        Role::SchoolAdmin(_) => vec![
            ("Overview", Route::SchoolAdminHome {}),
            ("Teachers", Route::SchoolTeachers {}),
            ("Assignments", Route::SchoolAssignments {}),
        ],
        Role::Teacher(_) => vec![
            ("Overview", Route::TeacherHome {}),
            ("My Learning", Route::TeacherLearning {}),
        ],
    }
}

/// `/` always redirects from the shell; this only renders if the guard is bypassed.
#[component]
pub fn Home() -> Element {
    let ctx = use_context::<AppContext>();
    rsx! { RedirectTo { to: Route::home_for(ctx.role()) } }
}

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "page",
            h2 { "Page not found" }
            p { class: "muted", "Nothing lives at /{path}." }
        }
    }
}
