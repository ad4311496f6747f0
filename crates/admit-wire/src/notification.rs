//! Notification record.

use crate::session::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification created server-side and pushed to the recipient.
///
/// The client only ever mutates it through mark-read calls; reading removes
/// it from the unread count, it is never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient: UserId,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_without_id_is_rejected() {
        // Malformed push payloads must fail to decode so handlers drop them.
        let json = r#"{
            "recipient": 9,
            "title": "Review complete",
            "message": "Your documents were approved",
            "read": false,
            "created_at": "2026-02-01T10:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Notification>(json).is_err());
    }
}
