use tracing::warn;

use crate::domain::Identity;
use crate::store::{self, RecordStore};

pub const MEMBER_ROLE: &str = "Member";

/// Resolves a `user_id` to its email by scanning the loaded identities.
///
/// Returns an empty string when nothing matches, including when the list has
/// not been loaded yet.
pub fn email_for(identities: &[Identity], user_id: &str) -> String {
    identities
        .iter()
        .find(|identity| identity.user_id.as_deref() == Some(user_id))
        .and_then(|identity| identity.email.clone())
        .unwrap_or_default()
}

/// Identities eligible for the assignment picker.
pub fn members(identities: &[Identity]) -> Vec<&Identity> {
    identities
        .iter()
        .filter(|identity| identity.role.as_deref() == Some(MEMBER_ROLE))
        .collect()
}

/// Bulk-fetches identities from `collection`; failures are logged and read
/// as an empty list.
pub fn load_identities(store: &dyn RecordStore, collection: &str) -> Vec<Identity> {
    match store::select_as(store, collection, &[], None) {
        Ok(identities) => identities,
        Err(err) => {
            warn!(collection, error = %err, "failed to fetch identities");
            Vec::new()
        }
    }
}
