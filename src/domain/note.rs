use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::record_id::{self, RecordId};
use super::{text, timestamp};
use crate::store;

/// Which parent a note hangs off. Each scope has its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    Project,
    Task,
}

impl NoteScope {
    pub fn collection(self) -> &'static str {
        match self {
            NoteScope::Project => store::PROJECT_NOTES,
            NoteScope::Task => store::TASK_NOTES,
        }
    }

    pub fn parent_field(self) -> &'static str {
        match self {
            NoteScope::Project => "project_id",
            NoteScope::Task => "task_id",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::lenient"
    )]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text::lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text::reference")]
    pub created_by: Option<String>,
    #[serde(default, with = "timestamp::opt")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::lenient"
    )]
    pub project_id: Option<RecordId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::lenient"
    )]
    pub task_id: Option<RecordId>,
}

impl Note {
    /// Builds an append-only note for `parent` in the given scope.
    pub fn for_parent(
        scope: NoteScope,
        parent: &RecordId,
        title: Option<String>,
        description: String,
        created_by: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        let (project_id, task_id) = match scope {
            NoteScope::Project => (Some(parent.clone()), None),
            NoteScope::Task => (None, Some(parent.clone())),
        };
        Self {
            id: None,
            title,
            description: Some(description),
            created_by,
            created_at: Some(created_at),
            project_id,
            task_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteScope};
    use crate::domain::RecordId;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn task_notes_carry_only_the_task_reference() {
        let note = Note::for_parent(
            NoteScope::Task,
            &RecordId::from("t-1"),
            None,
            "called back".to_string(),
            Some("U1".to_string()),
            datetime!(2026-05-01 12:00:00 UTC),
        );
        let value = serde_json::to_value(&note).expect("note should encode");
        assert_eq!(value["task_id"], json!("t-1"));
        assert!(value.get("project_id").is_none());
        assert!(value.get("title").is_none());
        assert_eq!(value["created_at"], json!("2026-05-01T12:00:00Z"));
        assert_eq!(NoteScope::Task.collection(), "task_notes");
    }

    #[test]
    fn anonymous_author_is_stored_as_null() {
        let note = Note::for_parent(
            NoteScope::Project,
            &RecordId::from(3),
            Some("Status change".to_string()),
            "text".to_string(),
            None,
            datetime!(2026-05-01 12:00:00 UTC),
        );
        let value = serde_json::to_value(&note).expect("note should encode");
        assert_eq!(value["created_by"], json!(null));
        assert_eq!(value["project_id"], json!(3));
    }
}
