use std::error::Error;
use std::fmt;
use std::path::Path;

use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::{ConfigError, StoreConfig};
use crate::domain::{normalize_records, Identity, Note, OneOrMany, Project, RecordId, Task};
use crate::fanout::FanOutReport;
use crate::identity::{load_identities, members};
use crate::listing::{DueBucket, ProjectFilter};
use crate::session::Session;
use crate::store::rest::RestStore;
use crate::store::sqlite::SqliteStore;
use crate::store::{self, Record, RecordStore, StoreError};
use crate::views::{
    self, AssignSummary, Dashboard, NotificationList, ProfileEdit, ProfileView, ProjectDetail,
    ProjectInput, TaskDetail, TaskInput, TaskList,
};

/// Collections `import` may write to.
pub const IMPORTABLE_COLLECTIONS: [&str; 7] = [
    store::PROJECTS,
    store::TASKS,
    store::NOTIFICATIONS,
    store::PROJECT_NOTES,
    store::TASK_NOTES,
    store::USERS,
    store::USER_ROLES,
];

/// One CLI invocation: a store plus the signed-in identity.
pub struct App {
    store: Box<dyn RecordStore>,
    session: Session,
}

impl App {
    pub fn open(data_dir: &Path, config: &StoreConfig) -> Result<Self, AppError> {
        let store: Box<dyn RecordStore> = match config {
            StoreConfig::Sqlite { path } => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                debug!(path = %path.display(), "opening sqlite store");
                Box::new(SqliteStore::open(path)?)
            }
            StoreConfig::Rest { url, key } => {
                debug!(url = %url, "using rest store");
                Box::new(RestStore::new(url.as_str(), key.as_str())?)
            }
        };
        let session = Session::load(data_dir)?;
        Ok(Self { store, session })
    }

    fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn dashboard(&self, filter: ProjectFilter, page: usize, now: OffsetDateTime) -> Dashboard {
        let mut dashboard = Dashboard::open(self.store(), filter, now);
        dashboard.projects.goto_page(page);
        dashboard
    }

    pub fn project(&self, id: RecordId) -> ProjectDetail {
        ProjectDetail::open(self.store(), id)
    }

    pub fn create_project(&self, input: &ProjectInput, now: OffsetDateTime) -> Option<Project> {
        views::submit_project(self.store(), input, now)
    }

    pub fn change_status(&self, id: RecordId, label: &str, now: OffsetDateTime) -> FanOutReport {
        let detail = ProjectDetail::open(self.store(), id);
        detail.change_status(self.store(), &self.session, label, now)
    }

    pub fn add_project_note(&self, id: RecordId, text: &str, now: OffsetDateTime) -> ProjectDetail {
        let mut detail = ProjectDetail::open(self.store(), id);
        detail.draft = text.to_string();
        detail.add_note(self.store(), &self.session, now);
        detail
    }

    pub fn assign(&self, user_id: &str, project_ids: &[RecordId], now: OffsetDateTime) -> (AssignSummary, Dashboard) {
        let mut dashboard = Dashboard::open(self.store(), ProjectFilter::default(), now);
        let summary = dashboard.assign(self.store(), user_id, project_ids);
        (summary, dashboard)
    }

    pub fn tasks(&self, bucket: DueBucket, page: usize, now: OffsetDateTime) -> TaskList {
        let mut list = TaskList::open(self.store(), bucket, now);
        list.tasks.goto_page(page);
        list
    }

    pub fn task(&self, id: RecordId) -> TaskDetail {
        TaskDetail::open(self.store(), id)
    }

    pub fn create_task(&self, input: &TaskInput, now: OffsetDateTime) -> Option<Task> {
        views::submit_task(self.store(), input, now)
    }

    pub fn add_task_note(&self, id: RecordId, text: &str, now: OffsetDateTime) -> Option<Note> {
        let mut detail = TaskDetail::open(self.store(), id);
        detail.draft = text.to_string();
        detail.add_note(self.store(), &self.session, now)
    }

    pub fn notifications(&self, bucket: DueBucket, page: usize, now: OffsetDateTime) -> NotificationList {
        let mut list = NotificationList::open(self.store(), bucket, now);
        list.notifications.goto_page(page);
        list
    }

    pub fn notification_count(&self) -> usize {
        views::notification_count(self.store())
    }

    pub fn members(&self) -> Vec<Identity> {
        let roles = load_identities(self.store(), store::USER_ROLES);
        members(&roles).into_iter().cloned().collect()
    }

    pub fn profile(&self) -> ProfileView {
        ProfileView::open(self.store(), &self.session)
    }

    pub fn edit_profile(&self, edit: &ProfileEdit) -> ProfileView {
        let mut view = ProfileView::open(self.store(), &self.session);
        if view.error.is_none() {
            view.edit(self.store(), edit);
        }
        view
    }

    /// Loads a JSON object or array of objects into `collection`.
    pub fn import(&self, collection: &str, raw: &str) -> Result<usize, AppError> {
        if !IMPORTABLE_COLLECTIONS.contains(&collection) {
            return Err(AppError::InvalidArgument(format!(
                "unknown collection '{collection}'; expected one of: {}",
                IMPORTABLE_COLLECTIONS.join(", ")
            )));
        }
        let payload: Option<OneOrMany<Value>> = serde_json::from_str(raw)
            .map_err(|err| AppError::InvalidArgument(format!("invalid import JSON: {err}")))?;
        let records = normalize_records(payload)
            .into_iter()
            .map(|value| match value {
                Value::Object(record) => Ok(record),
                other => Err(AppError::InvalidArgument(format!(
                    "import rows must be JSON objects, got {other}"
                ))),
            })
            .collect::<Result<Vec<Record>, AppError>>()?;
        if records.is_empty() {
            return Ok(0);
        }
        let inserted = self.store().insert(collection, records)?;
        info!(collection, rows = inserted.len(), "imported records");
        Ok(inserted.len())
    }
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Config(ConfigError),
    Store(StoreError),
    Json(serde_json::Error),
    InvalidArgument(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Config(err) => write!(f, "config error: {}", err),
            AppError::Store(err) => write!(f, "{}", err),
            AppError::Json(err) => write!(f, "JSON output error: {}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::InvalidArgument(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Json(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Store(value)
    }
}

#[cfg(test)]
mod tests;
