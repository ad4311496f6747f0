//! Outbound message construction.
//!
//! Every operation writes the durable path first, then mirrors a live event
//! for recipients who are connected but have not refetched. A durable
//! failure aborts the operation; no live event goes out.

use crate::api::AdmissionApi;
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::store::{HistoryScope, MessageStore};
use admit_wire::{ClientEvent, DeliveryStatus, Message, RoomKey, UserId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Send strategy. Two call sites in the original product diverge here and
/// both are legitimate UX choices, so the behavior stays selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPolicy {
    /// Show the message only once the durable call confirms (admin screen).
    ConfirmThenDisplay,
    /// Insert a local echo immediately and reconcile on confirmation
    /// (embedded applicant widget).
    ImmediateEcho,
}

/// Builds and dispatches outbound messages, reactions and deletes.
pub struct Composer {
    api: Arc<dyn AdmissionApi>,
    conn: Arc<ConnectionManager>,
    store: Arc<MessageStore>,
    policy: SendPolicy,
    sender: UserId,
}

impl Composer {
    pub fn new(
        api: Arc<dyn AdmissionApi>,
        conn: Arc<ConnectionManager>,
        store: Arc<MessageStore>,
        policy: SendPolicy,
        sender: UserId,
    ) -> Self {
        Composer {
            api,
            conn,
            store,
            policy,
            sender,
        }
    }

    pub fn policy(&self) -> SendPolicy {
        self.policy
    }

    /// Send a text message to a room.
    pub async fn send(&self, room: &RoomKey, content: &str, receiver: UserId) -> Result<Message> {
        let scope = HistoryScope::Room(room.clone());
        match self.policy {
            SendPolicy::ConfirmThenDisplay => {
                let confirmed = self
                    .api
                    .send_message(room, content, self.sender, receiver)
                    .await?;
                self.store.append_live(&scope, confirmed.clone());
                self.conn
                    .emit(ClientEvent::Message {
                        message: confirmed.clone(),
                    })
                    .await;
                Ok(confirmed)
            }
            SendPolicy::ImmediateEcho => {
                let draft = Message {
                    id: 0,
                    room: room.clone(),
                    sender: self.sender,
                    receiver,
                    content: content.to_string(),
                    timestamp: Utc::now(),
                    status: DeliveryStatus::Sent,
                    reactions: HashMap::new(),
                    deleted: false,
                };
                let temp_id = self.store.append_optimistic(&scope, draft);
                match self
                    .api
                    .send_message(room, content, self.sender, receiver)
                    .await
                {
                    Ok(confirmed) => {
                        self.store.reconcile(&scope, temp_id, confirmed.clone());
                        self.conn
                            .emit(ClientEvent::Message {
                                message: confirmed.clone(),
                            })
                            .await;
                        Ok(confirmed)
                    }
                    Err(e) => {
                        // Back out the echo: a failed send leaves the list
                        // in its pre-call state.
                        self.store.remove(temp_id);
                        Err(e)
                    }
                }
            }
        }
    }

    /// Set this user's reaction on a message. The local reaction map is not
    /// touched here; it updates when the live echo arrives.
    pub async fn react(&self, message_id: i64, reaction: &str) -> Result<()> {
        self.api.set_reaction(message_id, reaction).await?;
        self.conn
            .emit(ClientEvent::Reaction {
                message_id,
                user_id: self.sender,
                reaction: reaction.to_string(),
            })
            .await;
        Ok(())
    }

    /// Delete a message. The local removal is driven by the live echo, not
    /// by this call's success.
    pub async fn delete(&self, message_id: i64, room: &RoomKey) -> Result<()> {
        self.api.delete_message(message_id).await?;
        self.conn
            .emit(ClientEvent::Delete {
                message_id,
                room: room.clone(),
            })
            .await;
        Ok(())
    }
}
