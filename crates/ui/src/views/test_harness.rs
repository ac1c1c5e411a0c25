use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use pd_core::model::{SchoolId, SchoolStatus, TeacherId};
use pd_core::time::fixed_now;
use services::{AppServices, Clock, ServicesConfig};
use storage::repository::Storage;
use storage::seed::seed_demo;

use crate::context::{Role, UiApp, build_app_context};
use crate::views::toast::Toaster;
use crate::views::{AdminHome, AdminSchools, SchoolTeachers, TeacherHome};
use crate::vm::Toast;

#[derive(Clone)]
struct TestApp {
    role: Role,
    services: AppServices,
}

impl UiApp for TestApp {
    fn role(&self) -> Role {
        self.role
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    AdminHome,
    AdminSchools,
    SchoolTeachers,
    TeacherHome,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    let slot = use_signal(|| None::<Toast>);
    use_context_provider(|| Toaster::new(slot));
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::AdminHome => rsx! { AdminHome {} },
        ViewKind::AdminSchools => rsx! { AdminSchools {} },
        ViewKind::SchoolTeachers => rsx! { SchoolTeachers {} },
        ViewKind::TeacherHome => rsx! { TeacherHome {} },
    }
}

/// Ids of the seeded demo records.
#[derive(Clone, Copy, Debug)]
pub struct SeededIds {
    pub approved_school: SchoolId,
    pub active_teacher: TeacherId,
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    /// Drives the dom until `needle` shows up or the attempts run out.
    pub async fn render_until(&mut self, needle: &str) -> String {
        let mut html = self.render();
        for _ in 0..20 {
            if html.contains(needle) {
                break;
            }
            self.drive_async().await;
            html = self.render();
        }
        html
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Seeds in-memory storage with the demo data set.
pub async fn seeded_storage() -> (Storage, SeededIds) {
    let storage = Storage::in_memory();
    seed_demo(&storage, fixed_now()).await.expect("seed demo data");

    let approved_school = storage
        .schools
        .list_schools()
        .await
        .expect("list schools")
        .into_iter()
        .find(|s| s.status() == SchoolStatus::Approved)
        .expect("approved school")
        .id();
    let active_teacher = storage
        .teachers
        .list_teachers(approved_school)
        .await
        .expect("list teachers")
        .into_iter()
        .find(|t| t.name() == "Asha Rao")
        .expect("seeded teacher")
        .id();
    (
        storage,
        SeededIds {
            approved_school,
            active_teacher,
        },
    )
}

pub fn setup_view_harness(view: ViewKind, role: Role, storage: Storage) -> ViewHarness {
    let services = AppServices::new(
        &storage,
        Clock::fixed(fixed_now()),
        &ServicesConfig::reliable(),
    );
    let app = Arc::new(TestApp { role, services });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom, storage }
}
