use time::OffsetDateTime;
use tracing::warn;

use super::assign::{bulk_assign, AssignSummary};
use crate::domain::{Identity, Project, RecordId};
use crate::identity::{email_for, load_identities};
use crate::listing::{ListView, PageReset, ProjectFilter, DASHBOARD_PAGE_SIZE};
use crate::store::{self, Order, RecordStore};

/// Project list with the "Active Forms" counter.
pub struct Dashboard {
    pub projects: ListView<Project, ProjectFilter>,
    pub users: Vec<Identity>,
}

impl Dashboard {
    pub fn open(store: &dyn RecordStore, filter: ProjectFilter, now: OffsetDateTime) -> Self {
        let mut projects = ListView::new(DASHBOARD_PAGE_SIZE, PageReset::OnFilterChange, now);
        projects.load(fetch_projects(store));
        projects.set_filter(filter);
        Self {
            projects,
            users: load_identities(store, store::USERS),
        }
    }

    /// Refetches the project list, keeping the current page and filter.
    pub fn refresh(&mut self, store: &dyn RecordStore) {
        self.projects.load(fetch_projects(store));
    }

    /// Assigns the selected projects, then refetches whatever the outcome.
    pub fn assign(
        &mut self,
        store: &dyn RecordStore,
        user_id: &str,
        project_ids: &[RecordId],
    ) -> AssignSummary {
        let summary = bulk_assign(store, user_id, project_ids);
        self.refresh(store);
        summary
    }

    pub fn active_forms(&self) -> usize {
        self.projects.total()
    }

    pub fn assignee_email(&self, project: &Project) -> String {
        match project.owner() {
            Some(user_id) => email_for(&self.users, user_id),
            None => String::new(),
        }
    }
}

fn fetch_projects(store: &dyn RecordStore) -> Vec<Project> {
    match store::select_as(
        store,
        store::PROJECTS,
        &[],
        Some(&Order::desc("created_at")),
    ) {
        Ok(projects) => projects,
        Err(err) => {
            warn!(error = %err, "error fetching forms");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Dashboard;
    use crate::domain::RecordId;
    use crate::listing::ProjectFilter;
    use crate::store::recording::{Operation, RecordingStore};
    use crate::store::{PROJECTS, USERS};
    use serde_json::json;
    use time::macros::datetime;

    fn store_with_projects() -> RecordingStore {
        let store = RecordingStore::new();
        store.seed(
            PROJECTS,
            vec![
                json!({"id": 1, "name": "Old", "status": "Nou", "created_at": "2026-01-01T00:00:00Z", "assigned_to": "U1"}),
                json!({"id": 2, "name": "New", "status": "Spam", "created_at": "2026-03-01T00:00:00Z"}),
                json!({"id": 3, "name": "Mid", "status": "Nou", "created_at": "2026-02-01T00:00:00Z", "assigned_to": "U9"}),
            ],
        );
        store.seed(
            USERS,
            vec![json!({"id": 10, "user_id": "U1", "email": "ana@example.com"})],
        );
        store
    }

    #[test]
    fn lists_newest_first_and_resolves_emails() {
        let store = store_with_projects();
        let dashboard = Dashboard::open(
            &store,
            ProjectFilter::default(),
            datetime!(2026-04-01 00:00:00 UTC),
        );

        let ids: Vec<_> = dashboard
            .projects
            .visible()
            .iter()
            .filter_map(|project| project.id.clone())
            .collect();
        assert_eq!(
            ids,
            vec![RecordId::from(2), RecordId::from(3), RecordId::from(1)]
        );
        assert_eq!(dashboard.active_forms(), 3);

        let visible = dashboard.projects.visible();
        assert_eq!(dashboard.assignee_email(visible[2]), "ana@example.com");
        assert_eq!(dashboard.assignee_email(visible[1]), "");
        assert_eq!(dashboard.assignee_email(visible[0]), "");
    }

    #[test]
    fn odd_typed_rows_still_list_with_their_neighbours() {
        let store = RecordingStore::new();
        store.seed(
            PROJECTS,
            vec![
                json!({"id": 1, "name": "Ana"}),
                json!({"id": 2, "name": 12345}),
                json!({"id": 3, "assigned_to": 7}),
            ],
        );
        let dashboard = Dashboard::open(
            &store,
            ProjectFilter::default(),
            datetime!(2026-04-01 00:00:00 UTC),
        );
        assert_eq!(dashboard.active_forms(), 3);
        assert_eq!(dashboard.projects.visible().len(), 3);
    }

    #[test]
    fn unassigned_filter_keeps_total_count() {
        let store = store_with_projects();
        let dashboard = Dashboard::open(
            &store,
            ProjectFilter::new(None, true),
            datetime!(2026-04-01 00:00:00 UTC),
        );
        assert_eq!(dashboard.projects.filtered().len(), 1);
        assert_eq!(dashboard.active_forms(), 3);
    }

    #[test]
    fn assignment_refetches_even_when_updates_fail() {
        let store = store_with_projects();
        let mut dashboard = Dashboard::open(
            &store,
            ProjectFilter::new(None, true),
            datetime!(2026-04-01 00:00:00 UTC),
        );
        let summary = dashboard.assign(&store, "U1", &[RecordId::from(2)]);
        assert_eq!(summary.assigned.len(), 1);
        assert!(dashboard.projects.filtered().is_empty());

        store.fail_on(Operation::Update, PROJECTS);
        let selects_before = store.calls().len();
        let summary = dashboard.assign(&store, "U1", &[RecordId::from(1)]);
        assert_eq!(summary.failed.len(), 1);
        let selects_after = store
            .calls()
            .iter()
            .skip(selects_before)
            .filter(|call| call.operation == Operation::Select)
            .count();
        assert_eq!(selects_after, 1);
    }

    #[test]
    fn fetch_failure_renders_an_empty_dashboard() {
        let store = store_with_projects();
        store.fail_on(Operation::Select, PROJECTS);
        let dashboard = Dashboard::open(
            &store,
            ProjectFilter::default(),
            datetime!(2026-04-01 00:00:00 UTC),
        );
        assert_eq!(dashboard.active_forms(), 0);
        assert!(dashboard.projects.visible().is_empty());
        assert_eq!(dashboard.users.len(), 1);
    }
}
