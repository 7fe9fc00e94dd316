pub mod identity;
pub mod note;
pub mod notification;
pub mod project;
pub mod record_id;
pub mod task;
pub mod text;
pub mod timestamp;

pub use identity::Identity;
pub use note::{Note, NoteScope};
pub use notification::Notification;
pub use project::Project;
pub use record_id::RecordId;
pub use task::Task;

/// Placeholder rendered for any missing field on a detail view.
pub const NO_INFORMATION: &str = "No information";

/// Normalizes a "one record or many" payload into an ordered sequence.
pub fn normalize_records<T>(value: Option<OneOrMany<T>>) -> Vec<T> {
    match value {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}
