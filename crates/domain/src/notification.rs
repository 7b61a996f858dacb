//! User notifications.

use serde::{Deserialize, Serialize};

use crate::time::{self, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(with = "time::lenient")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub read: bool,
}

#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Mark every notification read locally, after the backend accepted it.
pub fn mark_all_read(notifications: &mut [Notification]) {
    for notification in notifications {
        notification.read = true;
    }
}
