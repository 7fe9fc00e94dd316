use time::OffsetDateTime;
use tracing::{error, warn};

use crate::domain::text::non_empty;
use crate::domain::{Identity, Note, NoteScope, Project, RecordId, Task};
use crate::fanout::{self, FanOutReport, StatusChange};
use crate::identity::{email_for, load_identities};
use crate::session::Session;
use crate::store::{self, Filter, RecordStore};

/// One project with its tasks and notes.
///
/// Adding a note refetches the note list; the task detail view does not.
pub struct ProjectDetail {
    pub project_id: RecordId,
    pub project: Option<Project>,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
    pub users: Vec<Identity>,
    pub draft: String,
}

impl ProjectDetail {
    pub fn open(store: &dyn RecordStore, project_id: RecordId) -> Self {
        let project = match store::select_one_as::<Project>(
            store,
            store::PROJECTS,
            &[Filter::eq("id", project_id.to_value())],
        ) {
            Ok(project) => Some(project),
            Err(err) => {
                warn!(project = %project_id, error = %err, "error fetching form details");
                None
            }
        };
        let tasks = fetch_children(store, store::TASKS, "project_id", &project_id, "tasks");
        let mut detail = Self {
            project_id,
            project,
            tasks,
            notes: Vec::new(),
            users: load_identities(store, store::USERS),
            draft: String::new(),
        };
        detail.refresh_notes(store);
        detail
    }

    pub fn refresh_notes(&mut self, store: &dyn RecordStore) {
        let scope = NoteScope::Project;
        self.notes = fetch_children(
            store,
            scope.collection(),
            scope.parent_field(),
            &self.project_id,
            "notes",
        );
    }

    pub fn assignee_email(&self) -> String {
        self.project
            .as_ref()
            .and_then(|project| project.assigned_to.as_deref())
            .map(|user_id| email_for(&self.users, user_id))
            .unwrap_or_default()
    }

    /// Appends the draft as a note. An empty draft is ignored without
    /// touching the store; a failed insert keeps the draft.
    pub fn add_note(
        &mut self,
        store: &dyn RecordStore,
        session: &Session,
        now: OffsetDateTime,
    ) -> Option<Note> {
        let description = non_empty(&self.draft)?;
        let note = Note::for_parent(
            NoteScope::Project,
            &self.project_id,
            None,
            description,
            session.user_id().map(str::to_string),
            now,
        );
        match store::insert_one(store, NoteScope::Project.collection(), &note) {
            Ok(saved) => {
                self.draft.clear();
                self.refresh_notes(store);
                Some(saved)
            }
            Err(err) => {
                error!(project = %self.project_id, error = %err, "error adding note");
                None
            }
        }
    }

    /// Runs the status fan-out for this project. The owner comes from the
    /// loaded project, or from a fresh fetch when the project did not load.
    pub fn change_status(
        &self,
        store: &dyn RecordStore,
        session: &Session,
        label: &str,
        now: OffsetDateTime,
    ) -> FanOutReport {
        let fetched;
        let assigned_to = match self.project.as_ref() {
            Some(project) => project.assigned_to.as_deref(),
            None => {
                fetched = fanout::current_assignee(store, &self.project_id);
                fetched.as_deref()
            }
        };
        fanout::run_status_change(
            store,
            session,
            &StatusChange {
                project_id: &self.project_id,
                label,
                assigned_to,
                now,
            },
        )
    }
}

pub(crate) fn fetch_children<T: serde::de::DeserializeOwned>(
    store: &dyn RecordStore,
    collection: &str,
    parent_field: &str,
    parent: &RecordId,
    what: &'static str,
) -> Vec<T> {
    let filters = [Filter::eq(parent_field, parent.to_value())];
    match store::select_as(store, collection, &filters, None) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(parent = %parent, error = %err, "error fetching {what}");
            Vec::new()
        }
    }
}
