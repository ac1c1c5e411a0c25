use pd_core::model::TeacherId;
use storage::repository::Storage;

use super::test_harness::{ViewKind, seeded_storage, setup_view_harness};
use crate::context::Role;

#[tokio::test(flavor = "current_thread")]
async fn admin_home_renders_platform_counts() {
    let (storage, _) = seeded_storage().await;
    let mut harness = setup_view_harness(ViewKind::AdminHome, Role::Admin, storage);
    harness.rebuild();

    let html = harness.render_until("Pending schools").await;
    assert!(html.contains("Platform overview"), "missing title in {html}");
    assert!(html.contains("Pending schools"), "missing tile in {html}");
    assert!(html.contains("Published modules"), "missing tile in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_schools_lists_pending_registrations() {
    let (storage, _) = seeded_storage().await;
    let mut harness = setup_view_harness(ViewKind::AdminSchools, Role::Admin, storage);
    harness.rebuild();

    let html = harness.render_until("Hillview Academy").await;
    assert!(html.contains("Pending registrations"), "missing heading in {html}");
    assert!(html.contains("Hillview Academy"), "missing pending school in {html}");
    assert!(html.contains("Riverside High School"), "missing approved school in {html}");
    assert!(html.contains("Approve"), "missing approve action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn school_teachers_shows_seat_usage() {
    let (storage, ids) = seeded_storage().await;
    let mut harness = setup_view_harness(
        ViewKind::SchoolTeachers,
        Role::SchoolAdmin(ids.approved_school),
        storage,
    );
    harness.rebuild();

    let html = harness.render_until("seats used").await;
    assert!(html.contains("3 of 5 seats used"), "missing capacity in {html}");
    assert!(html.contains("Meera Iyer"), "missing invited teacher in {html}");
    assert!(html.contains("Invite a teacher"), "missing invite form in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn teacher_home_offers_the_assessment() {
    let (storage, ids) = seeded_storage().await;
    let mut harness = setup_view_harness(
        ViewKind::TeacherHome,
        Role::Teacher(ids.active_teacher),
        storage,
    );
    harness.rebuild();

    let html = harness.render_until("Welcome back").await;
    assert!(html.contains("Welcome back, Asha Rao"), "missing greeting in {html}");
    assert!(
        html.contains("Start competency assessment"),
        "missing assessment CTA in {html}"
    );
    assert!(html.contains("Open assignments"), "missing tiles in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_teacher_renders_error() {
    let mut harness = setup_view_harness(
        ViewKind::TeacherHome,
        Role::Teacher(TeacherId::new(404)),
        Storage::in_memory(),
    );
    harness.rebuild();

    let html = harness.render_until("not found").await;
    assert!(html.contains("teacher 404 not found"), "missing error in {html}");
}
