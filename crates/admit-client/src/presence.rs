//! Presence and typing state, driven entirely by inbound events.
//!
//! Absent entries are offline. Typing flags are normally cleared by the
//! sender's own `typing:false` (emitted after a quiet period), but a
//! receiver-side staleness window guards against that event getting lost on
//! a dropped connection.

use crate::connection::ConnectionManager;
use admit_wire::{ClientEvent, RoomKey, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// Receiver-side view of who is online and who is typing.
pub struct PresenceTracker {
    stale_after: Duration,
    online: RwLock<HashMap<UserId, bool>>,
    typing: RwLock<HashMap<UserId, (bool, Instant)>>,
}

impl PresenceTracker {
    pub fn new(stale_after: Duration) -> Self {
        PresenceTracker {
            stale_after,
            online: RwLock::new(HashMap::new()),
            typing: RwLock::new(HashMap::new()),
        }
    }

    /// Overwrite a user's online flag. No history is retained.
    pub fn set_online(&self, user_id: UserId, is_online: bool) {
        self.online.write().insert(user_id, is_online);
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.online.read().get(&user_id).copied().unwrap_or(false)
    }

    /// Overwrite a user's typing flag.
    pub fn set_typing(&self, user_id: UserId, is_typing: bool) {
        self.typing.write().insert(user_id, (is_typing, Instant::now()));
    }

    pub fn is_typing(&self, user_id: UserId) -> bool {
        self.is_typing_at(user_id, Instant::now())
    }

    fn is_typing_at(&self, user_id: UserId, now: Instant) -> bool {
        match self.typing.read().get(&user_id) {
            Some((true, since)) => now.duration_since(*since) <= self.stale_after,
            _ => false,
        }
    }

    pub fn typing_users(&self) -> Vec<UserId> {
        let now = Instant::now();
        self.typing
            .read()
            .iter()
            .filter(|(_, (flag, since))| *flag && now.duration_since(*since) <= self.stale_after)
            .map(|(user, _)| *user)
            .collect()
    }
}

/// Sender-side typing announcer.
///
/// The first keystroke emits `typing:true`; further keystrokes push the
/// deadline out; once the quiet period elapses with no keystrokes,
/// `typing:false` goes out. Emissions are dropped while disconnected, same
/// as every live event.
pub struct TypingAnnouncer {
    keystrokes: mpsc::Sender<()>,
}

impl TypingAnnouncer {
    pub fn new(
        conn: Arc<ConnectionManager>,
        room: RoomKey,
        user_id: UserId,
        quiet: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(announce_loop(conn, room, user_id, quiet, rx));
        TypingAnnouncer { keystrokes: tx }
    }

    /// Record one keystroke.
    pub async fn keystroke(&self) {
        if self.keystrokes.send(()).await.is_err() {
            debug!("[Typing] Announcer loop gone, keystroke dropped");
        }
    }
}

async fn announce_loop(
    conn: Arc<ConnectionManager>,
    room: RoomKey,
    user_id: UserId,
    quiet: Duration,
    mut keystrokes: mpsc::Receiver<()>,
) {
    let mut typing = false;
    let mut deadline = Instant::now();

    loop {
        if typing {
            tokio::select! {
                key = keystrokes.recv() => match key {
                    Some(_) => deadline = Instant::now() + quiet,
                    None => {
                        emit_typing(&conn, &room, user_id, false).await;
                        return;
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    emit_typing(&conn, &room, user_id, false).await;
                    typing = false;
                }
            }
        } else {
            match keystrokes.recv().await {
                Some(_) => {
                    emit_typing(&conn, &room, user_id, true).await;
                    typing = true;
                    deadline = Instant::now() + quiet;
                }
                None => return,
            }
        }
    }
}

async fn emit_typing(conn: &ConnectionManager, room: &RoomKey, user_id: UserId, is_typing: bool) {
    conn.emit(ClientEvent::Typing {
        room: room.clone(),
        user_id,
        is_typing,
    })
    .await;
}
