use time::OffsetDateTime;
use tracing::warn;

use crate::domain::{Identity, Task};
use crate::identity::{email_for, load_identities};
use crate::listing::{DueBucket, ListView, PageReset, TASKS_PAGE_SIZE};
use crate::store::{self, RecordStore};

/// All tasks, five per page. Changing the bucket keeps the current page.
pub struct TaskList {
    pub tasks: ListView<Task, DueBucket>,
    pub users: Vec<Identity>,
}

impl TaskList {
    pub fn open(store: &dyn RecordStore, bucket: DueBucket, now: OffsetDateTime) -> Self {
        let mut tasks = ListView::new(TASKS_PAGE_SIZE, PageReset::Never, now);
        tasks.load(match store::select_as(store, store::TASKS, &[], None) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "error fetching tasks");
                Vec::new()
            }
        });
        tasks.set_filter(bucket);
        Self {
            tasks,
            users: load_identities(store, store::USERS),
        }
    }

    pub fn assignee_email(&self, task: &Task) -> String {
        task.assigned_to
            .as_deref()
            .map(|user_id| email_for(&self.users, user_id))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::TaskList;
    use crate::listing::DueBucket;
    use crate::store::recording::{Operation, RecordingStore};
    use crate::store::TASKS;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn overdue_bucket_skips_tasks_without_deadline() {
        let store = RecordingStore::new();
        store.seed(
            TASKS,
            vec![
                json!({"id": "a", "due_date": "2026-04-01T00:00:00Z"}),
                json!({"id": "b", "due_date": null}),
                json!({"id": "c", "due_date": "2026-06-01T00:00:00Z"}),
                json!({"id": "d", "due_date": "not a date"}),
            ],
        );
        let list = TaskList::open(
            &store,
            DueBucket::Overdue,
            datetime!(2026-04-10 00:00:00 UTC),
        );
        assert_eq!(list.tasks.total(), 4);
        assert_eq!(list.tasks.filtered().len(), 1);
    }

    #[test]
    fn failed_fetch_yields_empty_list() {
        let store = RecordingStore::new();
        store.fail_on(Operation::Select, TASKS);
        let list = TaskList::open(&store, DueBucket::All, datetime!(2026-04-10 00:00:00 UTC));
        assert_eq!(list.tasks.page_count(), 0);
    }
}
