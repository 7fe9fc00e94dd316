use time::OffsetDateTime;
use tracing::{debug, error, warn};

use crate::domain::timestamp::format_full;
use crate::domain::{Note, NoteScope, Notification, Project, RecordId, Task};
use crate::session::Session;
use crate::status;
use crate::store::{self, Filter, RecordStore, StoreError};

/// One status selection on a project.
#[derive(Debug, Clone)]
pub struct StatusChange<'a> {
    pub project_id: &'a RecordId,
    pub label: &'a str,
    /// The project's owner as currently loaded; copied onto the task and
    /// the notification.
    pub assigned_to: Option<&'a str>,
    pub now: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutStep {
    StatusUpdate,
    TaskInsert,
    NotificationInsert,
    AuditNote,
}

impl FanOutStep {
    pub const ORDER: [FanOutStep; 4] = [
        FanOutStep::StatusUpdate,
        FanOutStep::TaskInsert,
        FanOutStep::NotificationInsert,
        FanOutStep::AuditNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FanOutStep::StatusUpdate => "status_update",
            FanOutStep::TaskInsert => "task_insert",
            FanOutStep::NotificationInsert => "notification_insert",
            FanOutStep::AuditNote => "audit_note",
        }
    }
}

/// Outcome of every write the fan-out attempted. A failed step never stops
/// the ones after it, so partial results are normal.
#[derive(Debug)]
pub struct FanOutReport {
    pub status_update: Result<(), StoreError>,
    pub task: Result<Task, StoreError>,
    pub notification: Result<Notification, StoreError>,
    pub audit_note: Result<Note, StoreError>,
}

impl FanOutReport {
    pub fn error(&self, step: FanOutStep) -> Option<&StoreError> {
        match step {
            FanOutStep::StatusUpdate => self.status_update.as_ref().err(),
            FanOutStep::TaskInsert => self.task.as_ref().err(),
            FanOutStep::NotificationInsert => self.notification.as_ref().err(),
            FanOutStep::AuditNote => self.audit_note.as_ref().err(),
        }
    }

    /// Every step in write order with its error, if any.
    pub fn outcomes(&self) -> [(FanOutStep, Option<&StoreError>); 4] {
        FanOutStep::ORDER.map(|step| (step, self.error(step)))
    }

    pub fn failures(&self) -> usize {
        self.outcomes()
            .iter()
            .filter(|(_, err)| err.is_some())
            .count()
    }
}

/// Applies a status label to a project and fans it out into a follow-up
/// task, a notification and an audit note, in that order.
///
/// The four writes are independent requests. Nothing is rolled back and an
/// early failure does not abort the later steps.
pub fn run_status_change(
    store: &dyn RecordStore,
    session: &Session,
    change: &StatusChange<'_>,
) -> FanOutReport {
    let StatusChange {
        project_id,
        label,
        assigned_to,
        now,
    } = *change;

    let status_update = update_project_status(store, project_id, label);
    log_step(FanOutStep::StatusUpdate, project_id, status_update.as_ref().err());

    let due = status::due_date(label, now);
    let description = status::task_description(label);
    let assignee = assigned_to.map(str::to_string);

    let task = store::insert_one(
        store,
        store::TASKS,
        &Task {
            id: None,
            name: Some(label.to_string()),
            description: Some(description.clone()),
            status: Some(status::NEW_TASK_STATUS.to_string()),
            created_at: Some(now),
            due_date: due,
            assigned_to: assignee.clone(),
            project_id: Some(project_id.clone()),
        },
    );
    log_step(FanOutStep::TaskInsert, project_id, task.as_ref().err());

    let notification = store::insert_one(
        store,
        store::NOTIFICATIONS,
        &Notification {
            id: None,
            title: Some(label.to_string()),
            description: Some(description),
            created_at: Some(now),
            end_date: Some(due.unwrap_or(now)),
            project_id: Some(project_id.clone()),
            assigned_to: assignee,
        },
    );
    log_step(
        FanOutStep::NotificationInsert,
        project_id,
        notification.as_ref().err(),
    );

    let author = session.user_id().map(str::to_string);
    let audit_note = store::insert_one(
        store,
        NoteScope::Project.collection(),
        &Note::for_parent(
            NoteScope::Project,
            project_id,
            Some(status::AUDIT_NOTE_TITLE.to_string()),
            audit_description(label, now, session),
            author,
            now,
        ),
    );
    log_step(FanOutStep::AuditNote, project_id, audit_note.as_ref().err());

    FanOutReport {
        status_update,
        task,
        notification,
        audit_note,
    }
}

/// Current owner of a project for callers that have not loaded it. A failed
/// fetch reads as unassigned.
pub fn current_assignee(store: &dyn RecordStore, project_id: &RecordId) -> Option<String> {
    match store::select_one_as::<Project>(
        store,
        store::PROJECTS,
        &[Filter::eq("id", project_id.to_value())],
    ) {
        Ok(project) => project.assigned_to,
        Err(err) => {
            warn!(project = %project_id, error = %err, "could not load project owner");
            None
        }
    }
}

fn update_project_status(
    store: &dyn RecordStore,
    project_id: &RecordId,
    label: &str,
) -> Result<(), StoreError> {
    let mut patch = store::Record::new();
    patch.insert("status".to_string(), label.into());
    let updated = store.update(
        store::PROJECTS,
        patch,
        &[Filter::eq("id", project_id.to_value())],
    )?;
    if updated.is_empty() {
        debug!(project = %project_id, "status update matched no rows");
    }
    Ok(())
}

fn audit_description(label: &str, now: OffsetDateTime, session: &Session) -> String {
    format!(
        "The status has been changed to: {} at {} by {}",
        label,
        format_full(now),
        session.user_id().unwrap_or("unknown")
    )
}

fn log_step(step: FanOutStep, project_id: &RecordId, err: Option<&StoreError>) {
    match err {
        Some(err) => error!(
            step = step.as_str(),
            project = %project_id,
            error = %err,
            "status change step failed; continuing"
        ),
        None => debug!(step = step.as_str(), project = %project_id, "status change step done"),
    }
}

#[cfg(test)]
#[path = "fanout_tests_ext.rs"]
mod tests_ext;
