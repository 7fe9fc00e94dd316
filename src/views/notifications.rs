use time::OffsetDateTime;
use tracing::warn;

use crate::domain::Notification;
use crate::listing::{DueBucket, ListView, PageReset, NOTIFICATIONS_PAGE_SIZE};
use crate::store::{self, RecordStore};

pub struct NotificationList {
    pub notifications: ListView<Notification, DueBucket>,
}

impl NotificationList {
    pub fn open(store: &dyn RecordStore, bucket: DueBucket, now: OffsetDateTime) -> Self {
        let mut notifications = ListView::new(NOTIFICATIONS_PAGE_SIZE, PageReset::Never, now);
        notifications.load(fetch_notifications(store));
        notifications.set_filter(bucket);
        Self { notifications }
    }
}

/// Badge count for the navigation bar. Zero when the fetch fails.
pub fn notification_count(store: &dyn RecordStore) -> usize {
    fetch_notifications(store).len()
}

fn fetch_notifications(store: &dyn RecordStore) -> Vec<Notification> {
    match store::select_as(store, store::NOTIFICATIONS, &[], None) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "error fetching notifications");
            Vec::new()
        }
    }
}
