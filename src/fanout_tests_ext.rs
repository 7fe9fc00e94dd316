use super::{current_assignee, run_status_change, FanOutStep, StatusChange};
use crate::domain::RecordId;
use crate::session::Session;
use crate::store::recording::{Operation, RecordingStore};
use crate::store::{NOTIFICATIONS, PROJECTS, PROJECT_NOTES, TASKS};
use serde_json::json;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2026-04-10 09:30:00 UTC);

fn seeded_store() -> RecordingStore {
    let store = RecordingStore::new();
    store.seed(
        PROJECTS,
        vec![json!({"id": 1, "name": "Ion", "status": "Nou", "assigned_to": "U1"})],
    );
    store
}

fn change<'a>(project_id: &'a RecordId, label: &'a str) -> StatusChange<'a> {
    StatusChange {
        project_id,
        label,
        assigned_to: Some("U1"),
        now: NOW,
    }
}

#[test]
fn writes_happen_in_fixed_order() {
    let store = seeded_store();
    let id = RecordId::from(1);
    let report = run_status_change(&store, &Session::signed_in("U7"), &change(&id, "Spam"));

    assert_eq!(report.failures(), 0);
    assert_eq!(
        store.writes(),
        vec![
            (Operation::Update, PROJECTS.to_string()),
            (Operation::Insert, TASKS.to_string()),
            (Operation::Insert, NOTIFICATIONS.to_string()),
            (Operation::Insert, PROJECT_NOTES.to_string()),
        ]
    );
}

#[test]
fn a_failed_step_never_stops_the_others() {
    let targets = [
        (FanOutStep::StatusUpdate, Operation::Update, PROJECTS),
        (FanOutStep::TaskInsert, Operation::Insert, TASKS),
        (FanOutStep::NotificationInsert, Operation::Insert, NOTIFICATIONS),
        (FanOutStep::AuditNote, Operation::Insert, PROJECT_NOTES),
    ];
    for (step, operation, collection) in targets {
        let store = seeded_store();
        store.fail_on(operation, collection);
        let id = RecordId::from(1);
        let report = run_status_change(
            &store,
            &Session::signed_in("U7"),
            &change(&id, "Waiting funds"),
        );

        assert_eq!(store.writes().len(), 4, "all steps attempted when {step:?} fails");
        assert_eq!(report.failures(), 1);
        let failed: Vec<FanOutStep> = report
            .outcomes()
            .iter()
            .filter(|(_, err)| err.is_some())
            .map(|(step, _)| *step)
            .collect();
        assert_eq!(failed, vec![step]);
    }
}

#[test]
fn every_step_failing_is_still_reported_per_step() {
    let store = seeded_store();
    store.fail_on(Operation::Update, PROJECTS);
    store.fail_on(Operation::Insert, TASKS);
    store.fail_on(Operation::Insert, NOTIFICATIONS);
    store.fail_on(Operation::Insert, PROJECT_NOTES);
    let id = RecordId::from(1);
    let report = run_status_change(&store, &Session::anonymous(), &change(&id, "Spam"));
    assert_eq!(report.failures(), 4);
    assert_eq!(store.writes().len(), 4);
}

#[test]
fn accessing_funds_fans_out_with_five_day_deadline() {
    let store = seeded_store();
    let id = RecordId::from(1);
    let report = run_status_change(
        &store,
        &Session::signed_in("U7"),
        &change(&id, "Accessing funds"),
    );
    assert_eq!(report.failures(), 0);

    let projects = store.rows(PROJECTS);
    assert_eq!(projects[0]["status"], json!("Accessing funds"));
    assert_eq!(projects[0]["name"], json!("Ion"));

    let due = NOW + Duration::days(5);
    let task = report.task.expect("task inserted");
    assert_eq!(task.name.as_deref(), Some("Accessing funds"));
    assert_eq!(task.status.as_deref(), Some("new"));
    assert_eq!(task.assigned_to.as_deref(), Some("U1"));
    assert_eq!(task.project_id, Some(RecordId::from(1)));
    assert_eq!(task.created_at, Some(NOW));
    assert_eq!(task.due_date, Some(due));
    assert!(task
        .description
        .as_deref()
        .is_some_and(|text| text.contains("[Lead's Name]")));

    let notification = report.notification.expect("notification inserted");
    assert_eq!(notification.title.as_deref(), Some("Accessing funds"));
    assert_eq!(notification.end_date, Some(due));
    assert_eq!(notification.assigned_to.as_deref(), Some("U1"));
    assert_eq!(notification.description, task.description);

    let note = report.audit_note.expect("audit note inserted");
    assert_eq!(note.title.as_deref(), Some("Status change"));
    assert_eq!(note.created_by.as_deref(), Some("U7"));
    assert_eq!(note.project_id, Some(RecordId::from(1)));
    assert_eq!(
        note.description.as_deref(),
        Some("The status has been changed to: Accessing funds at 10/04/2026 09:30 by U7")
    );
    assert_eq!(store.rows(PROJECT_NOTES).len(), 1);
}

#[test]
fn unknown_label_gets_generic_task_and_no_offset() {
    let store = seeded_store();
    let id = RecordId::from(1);
    let report = run_status_change(&store, &Session::anonymous(), &change(&id, "Callback"));

    let task = report.task.expect("task inserted");
    assert_eq!(task.due_date, Some(NOW));
    assert_eq!(
        task.description.as_deref(),
        Some("Follow up on the new status: Callback.")
    );
    let note = report.audit_note.expect("note inserted");
    assert_eq!(note.created_by, None);
    assert!(note
        .description
        .as_deref()
        .is_some_and(|text| text.ends_with("by unknown")));
}

#[test]
fn overflowing_deadline_falls_back_to_now_for_the_notification() {
    let store = seeded_store();
    let id = RecordId::from(1);
    let now = datetime!(9999-12-31 23:00:00 UTC);
    let report = run_status_change(
        &store,
        &Session::signed_in("U7"),
        &StatusChange {
            project_id: &id,
            label: "Waiting funds",
            assigned_to: None,
            now,
        },
    );

    let task = report.task.expect("task inserted");
    assert_eq!(task.due_date, None);
    assert_eq!(task.assigned_to, None);
    let notification = report.notification.expect("notification inserted");
    assert_eq!(notification.end_date, Some(now));
}

#[test]
fn missing_project_still_produces_follow_up_records() {
    let store = seeded_store();
    let id = RecordId::from(99);
    let report = run_status_change(&store, &Session::signed_in("U7"), &change(&id, "Spam"));
    assert!(report.status_update.is_ok());
    assert_eq!(store.rows(TASKS).len(), 1);
    assert_eq!(store.rows(PROJECTS)[0]["status"], json!("Nou"));
}

#[test]
fn current_assignee_reads_project_owner() {
    let store = seeded_store();
    assert_eq!(
        current_assignee(&store, &RecordId::from(1)).as_deref(),
        Some("U1")
    );
    assert_eq!(current_assignee(&store, &RecordId::from(2)), None);
}
