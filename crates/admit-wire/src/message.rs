//! Chat message record.

use crate::room::RoomKey;
use crate::session::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Delivery status of a message. The server is the source of truth; the
/// client applies whatever status arrives last (overwrite, not a clamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

/// A chat message.
///
/// Server-assigned ids are positive and never change room or sender once
/// assigned. Optimistic client-side copies carry temporary negative ids
/// until the durable send resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub room: RoomKey,
    pub sender: UserId,
    pub receiver: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
    /// Per-user reaction, last writer wins.
    #[serde(default)]
    pub reactions: HashMap<UserId, String>,
    #[serde(default)]
    pub deleted: bool,
}

impl Message {
    /// Whether this message carries a temporary client-assigned identity.
    pub fn is_optimistic(&self) -> bool {
        self.id < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_message_defaults_on_deserialize() {
        let json = r#"{
            "id": 501,
            "room": "admin-42",
            "sender": 42,
            "receiver": 1,
            "content": "hello",
            "timestamp": "2026-02-01T10:00:00Z",
            "status": "sent"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.room, RoomKey::direct(Role::Admin, 42));
        assert_eq!(msg.status, DeliveryStatus::Sent);
        assert!(msg.reactions.is_empty());
        assert!(!msg.deleted);
        assert!(!msg.is_optimistic());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::Delivered).unwrap(),
            "\"delivered\""
        );
    }
}
