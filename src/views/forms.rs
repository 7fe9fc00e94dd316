use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use tracing::{error, info};

use crate::domain::text::non_empty;
use crate::domain::{Project, RecordId, Task};
use crate::status::NEW_PROJECT_STATUS;
use crate::store::{self, Record, RecordStore, StoreError};

/// Fields an agent types into the add-project form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub uniquecode: Option<String>,
    pub budget: Option<String>,
    pub project_type: Option<String>,
    pub info_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub project_id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub due: Option<Date>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

/// One past the largest numeric project id, or 0 for an empty collection.
/// Text ids are ignored.
pub fn next_project_id(store: &dyn RecordStore) -> Result<i64, StoreError> {
    let rows = store.select(store::PROJECTS, &[], None)?;
    let max = rows.iter().filter_map(numeric_id).max();
    Ok(max.map_or(0, |max| max.saturating_add(1)))
}

fn numeric_id(row: &Record) -> Option<i64> {
    let id: RecordId = serde_json::from_value(row.get("id")?.clone()).ok()?;
    RecordId::parse(&id.to_string()).as_number()
}

/// Inserts a new lead with status "Nou". Failures are logged and yield
/// `None`; no row is written when the next id cannot be computed.
pub fn submit_project(
    store: &dyn RecordStore,
    input: &ProjectInput,
    now: OffsetDateTime,
) -> Option<Project> {
    let id = match next_project_id(store) {
        Ok(id) => id,
        Err(err) => {
            error!(error = %err, "error fetching last project id");
            return None;
        }
    };
    let project = Project {
        id: Some(RecordId::from(id)),
        name: non_empty(&input.name),
        email: input.email.as_deref().and_then(non_empty),
        phone: input.phone.as_deref().and_then(non_empty),
        uniquecode: input.uniquecode.as_deref().and_then(non_empty),
        status: Some(NEW_PROJECT_STATUS.to_string()),
        budget: input.budget.as_deref().and_then(non_empty),
        project_type: input.project_type.as_deref().and_then(non_empty),
        info_from: input.info_from.as_deref().and_then(non_empty),
        assigned_to: None,
        created_at: Some(now),
        end_date: None,
        send_ad: false,
        notes: None,
    };
    match store::insert_one(store, store::PROJECTS, &project) {
        Ok(saved) => {
            info!(project = id, "project added");
            Some(saved)
        }
        Err(err) => {
            error!(project = id, error = %err, "error adding new project");
            None
        }
    }
}

/// Inserts a manually entered task. A blank assignee is stored as null.
pub fn submit_task(store: &dyn RecordStore, input: &TaskInput, now: OffsetDateTime) -> Option<Task> {
    let task = Task {
        id: None,
        name: non_empty(&input.name),
        description: input.description.as_deref().and_then(non_empty),
        status: input.status.as_deref().and_then(non_empty),
        created_at: Some(now),
        due_date: input
            .due
            .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc()),
        assigned_to: input.assigned_to.as_deref().and_then(non_empty),
        project_id: Some(input.project_id.clone()),
    };
    match store::insert_one(store, store::TASKS, &task) {
        Ok(saved) => Some(saved),
        Err(err) => {
            error!(project = %input.project_id, error = %err, "error adding task");
            None
        }
    }
}
