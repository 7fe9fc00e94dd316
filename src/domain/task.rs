use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::record_id::{self, RecordId};
use super::{text, timestamp};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::lenient"
    )]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub status: Option<String>,
    #[serde(default, with = "timestamp::opt")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "timestamp::opt")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "text::reference")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "record_id::lenient")]
    pub project_id: Option<RecordId>,
}
