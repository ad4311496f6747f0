//! Live-channel events.
//!
//! Both directions use JSON text frames shaped `{"type": ..., "data": ...}`.
//! Outbound mirrors of durable calls (`message`, `reaction`, `delete`) exist
//! for live fan-out only; persistence always goes through the REST path.

use crate::error::Result;
use crate::message::{DeliveryStatus, Message};
use crate::notification::Notification;
use crate::room::RoomKey;
use crate::session::UserId;
use serde::{Deserialize, Serialize};

/// Events the client sends over the live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "data")]
pub enum ClientEvent {
    JoinRoom { room: RoomKey },
    LeaveRoom { room: RoomKey },
    /// Admin dashboard subscription to the all-messages feed.
    SubscribeAll,
    /// Live mirror of a durably persisted message.
    Message { message: Message },
    Typing { room: RoomKey, user_id: UserId, is_typing: bool },
    Reaction { message_id: i64, user_id: UserId, reaction: String },
    Delete { message_id: i64, room: RoomKey },
}

/// Events the server pushes to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "data")]
pub enum ServerEvent {
    Message { message: Message },
    Status { message_id: i64, status: DeliveryStatus },
    Reaction { message_id: i64, user_id: UserId, reaction: String },
    Deleted { message_id: i64 },
    Typing { user_id: UserId, is_typing: bool },
    Presence { user_id: UserId, online: bool },
    Notification { notification: Notification },
}

impl ClientEvent {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerEvent {
    /// Decode a text frame. Callers drop the frame on error; live-event
    /// handlers never surface decode failures to the user.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_client_event_tagging() {
        let event = ClientEvent::JoinRoom {
            room: RoomKey::direct(Role::Admin, 42),
        };
        let json = event.to_json().unwrap();
        assert_eq!(json, r#"{"type":"join_room","data":{"room":"admin-42"}}"#);
    }

    #[test]
    fn test_server_event_roundtrip() {
        let json = r#"{"type":"status","data":{"message_id":501,"status":"delivered"}}"#;
        let event = ServerEvent::parse(json).unwrap();
        match event {
            ServerEvent::Status { message_id, status } => {
                assert_eq!(message_id, 501);
                assert_eq!(status, DeliveryStatus::Delivered);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_notification_frame_fails() {
        // Missing id inside the notification payload.
        let json = r#"{"type":"notification","data":{"notification":{
            "recipient":9,"title":"t","message":"m","read":false,
            "created_at":"2026-02-01T10:00:00Z"}}}"#;
        assert!(ServerEvent::parse(json).is_err());
    }

    #[test]
    fn test_unknown_event_type_fails() {
        assert!(ServerEvent::parse(r#"{"type":"mystery","data":{}}"#).is_err());
    }
}
