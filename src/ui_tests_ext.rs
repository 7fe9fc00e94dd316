use super::{
    page_bar, render_dashboard, render_fanout, render_notes, render_profile,
    render_project_detail, render_statuses, status_color_code, Palette,
};
use crate::domain::{Note, Notification, RecordId, Task};
use crate::fanout::FanOutReport;
use crate::listing::ProjectFilter;
use crate::session::Session;
use crate::store::recording::{Operation, RecordingStore};
use crate::store::{StoreError, PROJECTS, USERS};
use crate::views::{Dashboard, ProfileView, ProjectDetail};
use serde_json::json;
use time::macros::datetime;

#[test]
fn page_bar_brackets_current_page() {
    let palette = Palette::plain();
    assert_eq!(page_bar(2, 3, &palette), "pages: 1 [2] 3");
    assert_eq!(page_bar(1, 0, &palette), "page 0 of 0");
}

#[test]
fn colored_palette_wraps_text_in_escape_codes() {
    let palette = Palette { enabled: true };
    assert_eq!(palette.status("Spam"), "\x1b[31m[Spam]\x1b[0m");
    assert_eq!(Palette::plain().status(""), "[N/A]");
}

#[test]
fn status_colors_group_related_labels() {
    assert_eq!(status_color_code("Accessing funds"), "33");
    assert_eq!(status_color_code("Waiting funds"), "33");
    assert_eq!(status_color_code("Finalized"), "32");
    assert_eq!(status_color_code("Callback"), "37");
}

#[test]
fn dashboard_render_shows_counter_rows_and_pages() {
    let store = RecordingStore::new();
    store.seed(
        PROJECTS,
        vec![
            json!({"id": 1, "name": "Ion", "status": "Nou", "created_at": "2026-03-02T10:00:00Z", "assigned_to": "U1"}),
            json!({"id": 2, "name": null, "status": "Spam"}),
        ],
    );
    store.seed(USERS, vec![json!({"user_id": "U1", "email": "u1@example.com"})]);
    let dashboard = Dashboard::open(
        &store,
        ProjectFilter::default(),
        datetime!(2026-04-01 00:00:00 UTC),
    );

    let rendered = render_dashboard(&dashboard, &Palette::plain());
    assert!(rendered.starts_with("Welcome to your Dashboard!\nActive Forms: 2\n"));
    assert!(rendered.contains("#1 Ion [Nou] created 02/03/2026 assigned to: u1@example.com"));
    assert!(rendered.contains("#2 No information [Spam] created N/A assigned to: "));
    assert!(rendered.ends_with("pages: [1]\n"));
}

#[test]
fn missing_project_renders_placeholders() {
    let store = RecordingStore::new();
    let detail = ProjectDetail::open(&store, RecordId::from(9));
    let rendered = render_project_detail(&detail, &Palette::plain());
    assert!(rendered.contains("Name: No information"));
    assert!(rendered.contains("Assigned to: No information"));
    assert!(rendered.contains("no tasks"));
    assert!(rendered.contains("No notes available"));
}

#[test]
fn notes_render_author_date_title_and_body() {
    let notes = vec![Note {
        title: Some("Status change".to_string()),
        description: Some("moved on".to_string()),
        created_by: Some("U1".to_string()),
        created_at: Some(datetime!(2026-04-05 10:00:00 UTC)),
        ..Note::default()
    }];
    assert_eq!(
        render_notes(&notes, &Palette::plain()),
        "U1  05 Apr\n  [Status change]\n  moved on\n"
    );
}

#[test]
fn profile_render_shows_error_instead_of_fields() {
    let store = RecordingStore::new();
    store.fail_on(Operation::Select, USERS);
    let view = ProfileView::open(&store, &Session::signed_in("U1"));
    let rendered = render_profile(&view, &Palette::plain());
    assert_eq!(rendered, "Profile\nError fetching additional user data\n");
}

#[test]
fn statuses_list_their_offsets() {
    let rendered = render_statuses(&Palette::plain());
    assert!(rendered.contains("[Accessing funds] +5d"));
    assert!(rendered.contains("[Finalized] +0d"));
    assert_eq!(rendered.lines().count(), 6);
}

fn report_with_failed_task() -> FanOutReport {
    FanOutReport {
        status_update: Ok(()),
        task: Err(StoreError::Http {
            status: Some(503),
            message: "busy".to_string(),
        }),
        notification: Ok(Notification::default()),
        audit_note: Ok(Note::default()),
    }
}

#[test]
fn fanout_lists_each_step_and_counts_failures() {
    let rendered = render_fanout("Spam", &report_with_failed_task(), &Palette::plain());
    assert_eq!(
        rendered,
        "status change to [Spam]\n  ok status_update\n  failed task_insert: store request failed with HTTP 503: busy\n  ok notification_insert\n  ok audit_note\n1 of 4 steps failed\n"
    );
}

#[test]
fn fanout_marks_labels_outside_the_canonical_set() {
    let clean = FanOutReport {
        task: Ok(Task::default()),
        ..report_with_failed_task()
    };
    let rendered = render_fanout("Call back", &clean, &Palette::plain());
    assert!(rendered.starts_with("status change to [Call back] (custom label, due now)\n"));
    assert!(!rendered.contains("steps failed"));

    let canonical = render_fanout("Finalized", &clean, &Palette::plain());
    assert!(canonical.starts_with("status change to [Finalized]\n"));
}
