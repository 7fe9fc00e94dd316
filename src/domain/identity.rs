use serde::{Deserialize, Serialize};

use super::record_id::{self, RecordId};
use super::text;

/// A user account as exposed by `users_ext` and the role view.
///
/// `user_id` is the value other collections store in `assigned_to` and
/// `created_by`; `id` is only the row key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::lenient"
    )]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub name: Option<String>,
    #[serde(default, rename = "phoneNumber", deserialize_with = "text::lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::Identity;
    use serde_json::json;

    #[test]
    fn phone_comes_from_the_phone_number_column_only() {
        let identity: Identity = serde_json::from_value(json!({
            "user_id": "U1",
            "email": "ana@example.com",
            "phone": "0700 000 000",
            "phoneNumber": 40711222333i64
        }))
        .expect("row with both phone columns should decode");
        assert_eq!(identity.phone.as_deref(), Some("40711222333"));
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn odd_typed_columns_read_as_text_or_missing() {
        let identity: Identity = serde_json::from_value(json!({
            "id": {"uuid": "x"},
            "user_id": 17,
            "name": ["Ana"],
            "role": "Member"
        }))
        .expect("odd row should decode");
        assert_eq!(identity.id, None);
        assert_eq!(identity.user_id.as_deref(), Some("17"));
        assert_eq!(identity.name, None);
        assert_eq!(identity.role.as_deref(), Some("Member"));
    }
}
