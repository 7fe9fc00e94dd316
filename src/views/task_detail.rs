use time::OffsetDateTime;
use tracing::{error, warn};

use super::project_detail::fetch_children;
use crate::domain::text::{non_empty, normalize_text};
use crate::domain::timestamp::format_full;
use crate::domain::{Identity, Note, NoteScope, RecordId, Task, NO_INFORMATION};
use crate::identity::{email_for, load_identities};
use crate::session::Session;
use crate::store::{self, Filter, RecordStore};

pub struct TaskDetail {
    pub task_id: RecordId,
    pub task: Option<Task>,
    pub notes: Vec<Note>,
    pub users: Vec<Identity>,
    pub draft: String,
}

impl TaskDetail {
    pub fn open(store: &dyn RecordStore, task_id: RecordId) -> Self {
        let task = match store::select_one_as::<Task>(
            store,
            store::TASKS,
            &[Filter::eq("id", task_id.to_value())],
        ) {
            Ok(task) => Some(task),
            Err(err) => {
                warn!(task = %task_id, error = %err, "error fetching task");
                None
            }
        };
        let scope = NoteScope::Task;
        let notes = fetch_children(
            store,
            scope.collection(),
            scope.parent_field(),
            &task_id,
            "notes",
        );
        Self {
            task_id,
            task,
            notes,
            users: load_identities(store, store::USERS),
            draft: String::new(),
        }
    }

    /// Appends the draft as a task note and clears it. The note list is not
    /// refetched, so the new note shows up the next time the view opens.
    pub fn add_note(
        &mut self,
        store: &dyn RecordStore,
        session: &Session,
        now: OffsetDateTime,
    ) -> Option<Note> {
        let description = non_empty(&self.draft)?;
        let note = Note::for_parent(
            NoteScope::Task,
            &self.task_id,
            None,
            description,
            session.user_id().map(str::to_string),
            now,
        );
        match store::insert_one(store, NoteScope::Task.collection(), &note) {
            Ok(saved) => {
                self.draft.clear();
                Some(saved)
            }
            Err(err) => {
                error!(task = %self.task_id, error = %err, "error adding note");
                None
            }
        }
    }

    pub fn assignee(&self) -> String {
        let user_id = self
            .task
            .as_ref()
            .and_then(|task| task.assigned_to.as_deref());
        match user_id {
            Some(user_id) => {
                let email = email_for(&self.users, user_id);
                normalize_text(Some(&email), user_id)
            }
            None => NO_INFORMATION.to_string(),
        }
    }

    /// Plain-text summary meant for pasting into a chat message.
    pub fn share_text(&self) -> String {
        let task = self.task.clone().unwrap_or_default();
        let when = |value: Option<OffsetDateTime>| {
            value
                .map(format_full)
                .unwrap_or_else(|| NO_INFORMATION.to_string())
        };
        format!(
            "Task Details:\nName: {}\nDescription: {}\nCreated At: {}\nDue Date: {}\nAssigned To: {}\nStatus: {}",
            normalize_text(task.name.as_deref(), NO_INFORMATION),
            normalize_text(task.description.as_deref(), NO_INFORMATION),
            when(task.created_at),
            when(task.due_date),
            self.assignee(),
            normalize_text(task.status.as_deref(), NO_INFORMATION),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::TaskDetail;
    use crate::domain::RecordId;
    use crate::session::Session;
    use crate::store::recording::{Operation, RecordingStore};
    use crate::store::{TASKS, TASK_NOTES, USERS};
    use serde_json::json;
    use time::macros::datetime;

    fn seeded() -> RecordingStore {
        let store = RecordingStore::new();
        store.seed(
            TASKS,
            vec![json!({
                "id": "t1",
                "name": "Spam",
                "status": "new",
                "created_at": "2026-04-10T09:30:00Z",
                "due_date": "2026-04-12T09:30:00Z",
                "assigned_to": "U1",
                "project_id": 5
            })],
        );
        store.seed(
            TASK_NOTES,
            vec![json!({"id": "n1", "task_id": "t1", "description": "left voicemail"})],
        );
        store.seed(USERS, vec![json!({"user_id": "U1", "email": "u1@example.com"})]);
        store
    }

    #[test]
    fn adding_a_note_does_not_refetch() {
        let store = seeded();
        let mut detail = TaskDetail::open(&store, RecordId::from("t1"));
        assert_eq!(detail.notes.len(), 1);
        let selects_before = store.calls().len();

        detail.draft = "called again".to_string();
        let note = detail
            .add_note(
                &store,
                &Session::signed_in("U1"),
                datetime!(2026-04-11 08:00:00 UTC),
            )
            .expect("note should be added");

        assert_eq!(note.task_id, Some(RecordId::from("t1")));
        assert!(detail.draft.is_empty());
        assert_eq!(detail.notes.len(), 1);
        assert_eq!(store.calls().len(), selects_before + 1);
        assert_eq!(store.rows(TASK_NOTES).len(), 2);
    }

    #[test]
    fn empty_note_issues_no_insert() {
        let store = seeded();
        let mut detail = TaskDetail::open(&store, RecordId::from("t1"));
        assert!(detail
            .add_note(&store, &Session::anonymous(), datetime!(2026-04-11 08:00:00 UTC))
            .is_none());
        assert!(!store
            .calls()
            .iter()
            .any(|call| call.operation == Operation::Insert));
    }

    #[test]
    fn share_text_lists_every_field() {
        let store = seeded();
        let detail = TaskDetail::open(&store, RecordId::from("t1"));
        assert_eq!(
            detail.share_text(),
            "Task Details:\nName: Spam\nDescription: No information\nCreated At: 10/04/2026 09:30\nDue Date: 12/04/2026 09:30\nAssigned To: u1@example.com\nStatus: new"
        );
    }

    #[test]
    fn share_text_for_missing_task_uses_placeholders() {
        let store = seeded();
        let detail = TaskDetail::open(&store, RecordId::from("nope"));
        assert!(detail.task.is_none());
        let text = detail.share_text();
        assert!(text.contains("Name: No information"));
        assert!(text.contains("Assigned To: No information"));
    }
}
