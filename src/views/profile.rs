use serde_json::Value;
use tracing::warn;

use crate::domain::Identity;
use crate::session::Session;
use crate::store::{self, Filter, Record, RecordStore};

pub const USER_NOT_FOUND: &str = "User not found";
pub const FETCH_FAILED: &str = "Error fetching additional user data";
pub const UPDATE_FAILED: &str = "Error updating user data";

/// The signed-in user's own record. Unlike the other views, failures are
/// kept in `error` and shown to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileView {
    pub user_id: Option<String>,
    pub identity: Option<Identity>,
    pub error: Option<String>,
}

/// Replacement values; unset fields keep what the profile already shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ProfileView {
    pub fn open(store: &dyn RecordStore, session: &Session) -> Self {
        let Some(user_id) = session.user_id() else {
            return Self {
                error: Some(USER_NOT_FOUND.to_string()),
                ..Self::default()
            };
        };
        let mut view = Self {
            user_id: Some(user_id.to_string()),
            ..Self::default()
        };
        match store::select_as::<Identity>(
            store,
            store::USERS,
            &[Filter::eq("user_id", user_id)],
            None,
        ) {
            Ok(rows) => view.identity = rows.into_iter().next(),
            Err(err) => {
                warn!(user = user_id, error = %err, "error fetching profile");
                view.error = Some(FETCH_FAILED.to_string());
            }
        }
        view
    }

    /// Writes name, email and phone for this user. Returns whether the
    /// update went through.
    pub fn edit(&mut self, store: &dyn RecordStore, edit: &ProfileEdit) -> bool {
        let Some(user_id) = self.user_id.clone() else {
            self.error = Some(USER_NOT_FOUND.to_string());
            return false;
        };
        let current = self.identity.clone().unwrap_or_default();
        let pick = |new: &Option<String>, old: Option<String>| -> Value {
            new.clone().or(old).unwrap_or_default().into()
        };
        let mut patch = Record::new();
        patch.insert("name".to_string(), pick(&edit.name, current.name));
        patch.insert("email".to_string(), pick(&edit.email, current.email));
        patch.insert("phoneNumber".to_string(), pick(&edit.phone, current.phone));

        let updated = store
            .update(
                store::USERS,
                patch,
                &[Filter::eq("user_id", user_id.as_str())],
            )
            .and_then(|rows| {
                rows.into_iter()
                    .next()
                    .map(store::from_record::<Identity>)
                    .transpose()
            });
        match updated {
            Ok(identity) => {
                if identity.is_some() {
                    self.identity = identity;
                }
                self.error = None;
                true
            }
            Err(err) => {
                warn!(user = %user_id, error = %err, "error updating profile");
                self.error = Some(UPDATE_FAILED.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProfileEdit, ProfileView, FETCH_FAILED, UPDATE_FAILED, USER_NOT_FOUND};
    use crate::session::Session;
    use crate::store::recording::{Operation, RecordingStore};
    use crate::store::USERS;
    use serde_json::json;

    fn seeded() -> RecordingStore {
        let store = RecordingStore::new();
        store.seed(
            USERS,
            vec![json!({
                "id": 1,
                "user_id": "U1",
                "name": "Ana",
                "email": "ana@example.com",
                "phoneNumber": "0711"
            })],
        );
        store
    }

    #[test]
    fn anonymous_session_reports_user_not_found() {
        let store = seeded();
        let view = ProfileView::open(&store, &Session::anonymous());
        assert_eq!(view.error.as_deref(), Some(USER_NOT_FOUND));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn fetch_failure_is_surfaced() {
        let store = seeded();
        store.fail_on(Operation::Select, USERS);
        let view = ProfileView::open(&store, &Session::signed_in("U1"));
        assert_eq!(view.error.as_deref(), Some(FETCH_FAILED));
        assert!(view.identity.is_none());
    }

    #[test]
    fn unknown_user_loads_without_error() {
        let store = seeded();
        let view = ProfileView::open(&store, &Session::signed_in("U2"));
        assert!(view.identity.is_none());
        assert!(view.error.is_none());
    }

    #[test]
    fn edit_keeps_unchanged_fields() {
        let store = seeded();
        let mut view = ProfileView::open(&store, &Session::signed_in("U1"));
        assert!(view.edit(
            &store,
            &ProfileEdit {
                phone: Some("0799".to_string()),
                ..ProfileEdit::default()
            }
        ));
        let identity = view.identity.expect("profile loaded");
        assert_eq!(identity.phone.as_deref(), Some("0799"));
        assert_eq!(identity.name.as_deref(), Some("Ana"));
        assert_eq!(store.rows(USERS)[0]["phoneNumber"], json!("0799"));
    }

    #[test]
    fn edit_failure_is_surfaced() {
        let store = seeded();
        store.fail_on(Operation::Update, USERS);
        let mut view = ProfileView::open(&store, &Session::signed_in("U1"));
        assert!(!view.edit(&store, &ProfileEdit::default()));
        assert_eq!(view.error.as_deref(), Some(UPDATE_FAILED));
    }
}
