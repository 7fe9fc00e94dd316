//! Page-level state: each view fetches what it needs when it opens, holds it
//! in memory, and degrades to empty state when the store fails.

pub mod assign;
pub mod dashboard;
pub mod forms;
pub mod notifications;
pub mod profile;
pub mod project_detail;
pub mod task_detail;
pub mod tasks;

pub use assign::AssignSummary;
pub use dashboard::Dashboard;
pub use forms::{submit_project, submit_task, ProjectInput, TaskInput};
pub use notifications::{notification_count, NotificationList};
pub use profile::{ProfileEdit, ProfileView};
pub use project_detail::ProjectDetail;
pub use task_detail::TaskDetail;
pub use tasks::TaskList;
