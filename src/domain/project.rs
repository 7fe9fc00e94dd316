use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::record_id::{self, RecordId};
use super::{text, timestamp};

/// A lead ("Form" in the UI) tracked through the status pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::lenient"
    )]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub uniquecode: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub budget: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub project_type: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub info_from: Option<String>,
    #[serde(default, deserialize_with = "text::reference")]
    pub assigned_to: Option<String>,
    #[serde(default, with = "timestamp::opt")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "timestamp::opt")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "text::flag")]
    pub send_ad: bool,
    #[serde(default, deserialize_with = "text::lenient")]
    pub notes: Option<String>,
}

impl Project {
    /// The assignee reference. Blank values count as unassigned.
    pub fn owner(&self) -> Option<&str> {
        self.assigned_to
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::Project;
    use crate::domain::RecordId;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn decodes_loose_rows_without_failing() {
        let project: Project = serde_json::from_value(json!({
            "id": 12,
            "name": "Ion Popescu",
            "phone": 40712345678i64,
            "budget": 25000,
            "status": "Nou",
            "assigned_to": null,
            "created_at": "2026-04-02T09:00:00+00:00",
            "end_date": "not a date",
            "send_ad": true,
            "extra_column": "ignored"
        }))
        .expect("project should decode");

        assert_eq!(project.id, Some(RecordId::Number(12)));
        assert_eq!(project.phone.as_deref(), Some("40712345678"));
        assert_eq!(project.budget.as_deref(), Some("25000"));
        assert_eq!(project.created_at, Some(datetime!(2026-04-02 09:00:00 UTC)));
        assert_eq!(project.end_date, None);
        assert!(project.send_ad);
        assert_eq!(project.owner(), None);
    }

    #[test]
    fn non_text_values_in_text_columns_do_not_fail_the_row() {
        let project: Project = serde_json::from_value(json!({
            "id": 2,
            "name": 12345,
            "email": {"primary": "a@example.com"},
            "status": true,
            "assigned_to": 7,
            "notes": [1, 2]
        }))
        .expect("odd-typed project should decode");

        assert_eq!(project.name.as_deref(), Some("12345"));
        assert_eq!(project.email, None);
        assert_eq!(project.status.as_deref(), Some("true"));
        assert_eq!(project.assigned_to.as_deref(), Some("7"));
        assert_eq!(project.notes, None);
        assert_eq!(project.owner(), Some("7"));
    }

    #[test]
    fn blank_assignee_reads_as_unassigned() {
        let project: Project =
            serde_json::from_value(json!({"id": 3, "assigned_to": " "})).expect("blank owner");
        assert_eq!(project.assigned_to, None);
    }

    #[test]
    fn empty_row_decodes_to_placeholders() {
        let project: Project = serde_json::from_value(json!({})).expect("empty row");
        assert_eq!(project, Project::default());
    }

    #[test]
    fn serialization_omits_missing_id_but_keeps_null_assignee() {
        let value = serde_json::to_value(Project {
            name: Some("Ana".to_string()),
            ..Project::default()
        })
        .expect("project should encode");
        assert!(value.get("id").is_none());
        assert_eq!(value["assigned_to"], json!(null));
        assert_eq!(value["send_ad"], json!(false));
    }
}
