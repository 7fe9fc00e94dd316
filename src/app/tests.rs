use super::{App, AppError};
use crate::config::StoreConfig;
use crate::domain::RecordId;
use crate::listing::{DueBucket, ProjectFilter};
use crate::session::Session;
use crate::views::ProfileEdit;
use std::path::{Path, PathBuf};
use time::macros::datetime;
use uuid::Uuid;

fn unique_data_dir() -> PathBuf {
    let root = std::env::temp_dir().join(format!("leadboard-app-test-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&root).expect("temp data dir should be creatable");
    root
}

fn open_app(root: &Path) -> App {
    let config = StoreConfig::Sqlite {
        path: root.join("store.sqlite"),
    };
    App::open(root, &config).expect("app should open")
}

#[test]
fn open_reads_the_saved_session() {
    let root = unique_data_dir();
    Session::signed_in("U7").save(&root).expect("session should save");
    let app = open_app(&root);
    assert_eq!(app.session.user_id(), Some("U7"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn open_creates_the_store_directory() {
    let root = unique_data_dir();
    let config = StoreConfig::Sqlite {
        path: root.join("nested/dir/store.sqlite"),
    };
    App::open(&root, &config).expect("app should open");
    assert!(root.join("nested/dir/store.sqlite").exists());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn import_accepts_one_object_or_an_array() {
    let root = unique_data_dir();
    let app = open_app(&root);
    assert_eq!(
        app.import("projects", r#"{"id": 1, "name": "Ion"}"#)
            .expect("single object"),
        1
    );
    assert_eq!(
        app.import("projects", r#"[{"id": 2}, {"id": 3}]"#)
            .expect("array"),
        2
    );
    assert_eq!(app.import("projects", "null").expect("null payload"), 0);

    let unknown = app.import("leads", "[]").expect_err("unknown collection");
    assert!(matches!(unknown, AppError::InvalidArgument(_)));
    let scalar = app.import("tasks", "[1]").expect_err("scalar row");
    assert!(matches!(scalar, AppError::InvalidArgument(_)));
    let duplicate = app.import("projects", r#"{"id": 1}"#).expect_err("duplicate id");
    assert!(matches!(duplicate, AppError::Store(_)));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn status_change_shows_up_in_every_list() {
    let root = unique_data_dir();
    Session::signed_in("U7").save(&root).expect("session should save");
    let app = open_app(&root);
    app.import(
        "projects",
        r#"{"id": 1, "name": "Ion", "status": "Nou", "assigned_to": "U1"}"#,
    )
    .expect("seed project");

    let now = datetime!(2026-04-10 09:30:00 UTC);
    let report = app.change_status(RecordId::from(1), "Accessing funds", now);
    assert_eq!(report.failures(), 0);

    let detail = app.project(RecordId::from(1));
    let project = detail.project.as_ref().expect("project loads");
    assert_eq!(project.status.as_deref(), Some("Accessing funds"));
    assert_eq!(detail.tasks.len(), 1);
    assert_eq!(detail.notes.len(), 1);
    assert_eq!(detail.notes[0].created_by.as_deref(), Some("U7"));

    let tasks = app.tasks(DueBucket::All, 1, now);
    assert_eq!(tasks.tasks.total(), 1);
    assert_eq!(app.notification_count(), 1);
    let due_later = app.notifications(DueBucket::Overdue, 1, now);
    assert!(due_later.notifications.filtered().is_empty());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn notes_and_assignment_round_through_the_store() {
    let root = unique_data_dir();
    let app = open_app(&root);
    app.import("projects", r#"[{"id": 1}, {"id": 2}]"#)
        .expect("seed projects");
    let now = datetime!(2026-04-10 09:30:00 UTC);

    let detail = app.add_project_note(RecordId::from(1), "first call", now);
    assert_eq!(detail.notes.len(), 1);
    assert!(detail.draft.is_empty());

    let (summary, dashboard) = app.assign("U3", &[RecordId::from(1), RecordId::from(2)], now);
    assert_eq!(summary.assigned.len(), 2);
    assert!(dashboard
        .projects
        .filtered()
        .iter()
        .all(|project| project.assigned_to.as_deref() == Some("U3")));
    let unassigned = app.dashboard(ProjectFilter::new(None, true), 1, now);
    assert!(unassigned.projects.filtered().is_empty());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn members_come_from_the_role_view() {
    let root = unique_data_dir();
    let app = open_app(&root);
    app.import(
        "users_roles",
        r#"[{"user_id": "U1", "role": "Member"}, {"user_id": "U2", "role": "Admin"}]"#,
    )
    .expect("seed roles");
    let members = app.members();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id.as_deref(), Some("U1"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn profile_edit_updates_the_signed_in_user() {
    let root = unique_data_dir();
    let app = open_app(&root);
    app.import(
        "users_ext",
        r#"{"user_id": "U1", "name": "Ana", "email": "ana@example.com"}"#,
    )
    .expect("seed user");

    assert!(app.edit_profile(&ProfileEdit::default()).error.is_some());

    Session::signed_in("U1").save(&root).expect("session should save");
    let app = open_app(&root);
    let view = app.edit_profile(&ProfileEdit {
        name: Some("Ana Pop".to_string()),
        ..ProfileEdit::default()
    });
    assert!(view.error.is_none());
    let reloaded = app.profile();
    let identity = reloaded.identity.expect("profile loads");
    assert_eq!(identity.name.as_deref(), Some("Ana Pop"));
    assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn filtered_dashboard_opens_on_the_requested_page() {
    let root = unique_data_dir();
    let app = open_app(&root);
    let rows: Vec<String> = (0..25)
        .map(|id| {
            let status = if id % 2 == 0 { "Spam" } else { "Nou" };
            format!(r#"{{"id": {id}, "status": "{status}"}}"#)
        })
        .collect();
    app.import("projects", &format!("[{}]", rows.join(",")))
        .expect("seed projects");

    let dashboard = app.dashboard(
        ProjectFilter::new(Some("Spam"), false),
        2,
        datetime!(2026-04-10 12:00:00 UTC),
    );
    assert_eq!(dashboard.projects.page(), 2);
    assert_eq!(dashboard.projects.filtered().len(), 13);
    assert_eq!(dashboard.projects.visible().len(), 3);
    assert_eq!(dashboard.active_forms(), 25);

    let _ = std::fs::remove_dir_all(root);
}
