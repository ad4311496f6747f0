//! Room membership bookkeeping.
//!
//! Two subscription strategies coexist: the single-conversation widget joins
//! and leaves individual rooms, while the admin dashboard subscribes once to
//! the all-messages feed.

use crate::connection::ConnectionManager;
use admit_wire::{ClientEvent, RoomKey};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// How this surface subscribes to live messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStrategy {
    /// Join/leave one room at a time.
    PerRoom,
    /// Subscribe to every message (admin dashboard).
    GlobalFeed,
}

/// Tracks which rooms this client has joined.
pub struct RoomRegistry {
    conn: Arc<ConnectionManager>,
    strategy: SubscriptionStrategy,
    joined: RwLock<HashSet<RoomKey>>,
}

impl RoomRegistry {
    pub fn new(conn: Arc<ConnectionManager>, strategy: SubscriptionStrategy) -> Self {
        RoomRegistry {
            conn,
            strategy,
            joined: RwLock::new(HashSet::new()),
        }
    }

    pub fn strategy(&self) -> SubscriptionStrategy {
        self.strategy
    }

    /// Emit a join intent. A no-op returning false while the connection is
    /// not open; the intent is not queued, callers must re-issue it (or use
    /// `rejoin_all`) once the connection comes back.
    pub async fn join(&self, room: RoomKey) -> bool {
        if !self.conn.is_open() {
            debug!("[Rooms] Join {} skipped, connection not open", room);
            return false;
        }
        let sent = self.conn.emit(ClientEvent::JoinRoom { room: room.clone() }).await;
        if sent {
            self.joined.write().insert(room);
        }
        sent
    }

    /// Best-effort leave, no acknowledgement expected.
    pub async fn leave(&self, room: &RoomKey) {
        self.joined.write().remove(room);
        let _ = self.conn.emit(ClientEvent::LeaveRoom { room: room.clone() }).await;
    }

    /// Subscribe to the all-messages feed. Only meaningful for the
    /// `GlobalFeed` strategy.
    pub async fn subscribe_all(&self) -> bool {
        if self.strategy != SubscriptionStrategy::GlobalFeed {
            return false;
        }
        self.conn.emit(ClientEvent::SubscribeAll).await
    }

    /// Re-issue join intents for every previously joined room after a
    /// manual reconnect. Returns the number of joins sent.
    pub async fn rejoin_all(&self) -> usize {
        let rooms: Vec<RoomKey> = self.joined.read().iter().cloned().collect();
        let mut sent = 0;
        for room in rooms {
            if self.conn.emit(ClientEvent::JoinRoom { room }).await {
                sent += 1;
            }
        }
        sent
    }

    pub fn joined(&self) -> Vec<RoomKey> {
        self.joined.read().iter().cloned().collect()
    }

    pub fn is_joined(&self, room: &RoomKey) -> bool {
        self.joined.read().contains(room)
    }
}
