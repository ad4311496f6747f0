//! In-memory message log, reconciled between durable history and live
//! events.
//!
//! The durable and live channels race freely, so every insert deduplicates
//! by server id. Optimistic entries carry temporary negative ids until the
//! durable send resolves; reconciliation replaces them by id, falling back
//! to a short content+timestamp match window.

use admit_wire::{DeliveryStatus, Message, RoomKey, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// How far apart an optimistic timestamp may be from the confirmed one and
/// still match during fallback reconciliation.
const RECONCILE_WINDOW_SECS: i64 = 5;

/// Scope of a message log: one room, or the admin-wide feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryScope {
    Room(RoomKey),
    Global,
}

impl HistoryScope {
    fn key(&self) -> &str {
        match self {
            HistoryScope::Room(room) => room.as_str(),
            HistoryScope::Global => "*",
        }
    }
}

/// Ordered in-memory message logs keyed by scope.
pub struct MessageStore {
    logs: RwLock<HashMap<String, Vec<Message>>>,
    next_temp_id: AtomicI64,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        MessageStore {
            logs: RwLock::new(HashMap::new()),
            next_temp_id: AtomicI64::new(-1),
        }
    }

    /// Replace a scope's log entirely with the authoritative history.
    pub fn replace_history(&self, scope: &HistoryScope, messages: Vec<Message>) {
        self.logs.write().insert(scope.key().to_string(), messages);
    }

    /// Insert a message arriving over the live channel. Idempotent by id:
    /// returns false if the id is already present.
    pub fn append_live(&self, scope: &HistoryScope, message: Message) -> bool {
        let mut logs = self.logs.write();
        let log = logs.entry(scope.key().to_string()).or_default();
        if log.iter().any(|m| m.id == message.id) {
            return false;
        }
        log.push(message);
        true
    }

    /// Insert a client-originated message before server confirmation.
    /// Returns the temporary id the caller needs for reconciliation.
    pub fn append_optimistic(&self, scope: &HistoryScope, mut draft: Message) -> i64 {
        let temp_id = self.next_temp_id.fetch_sub(1, Ordering::SeqCst);
        draft.id = temp_id;
        let mut logs = self.logs.write();
        logs.entry(scope.key().to_string()).or_default().push(draft);
        temp_id
    }

    /// Resolve an optimistic entry against the server-confirmed message.
    ///
    /// If the live echo already inserted the confirmed id, the optimistic
    /// copy is dropped. Otherwise the entry is replaced in place, matched by
    /// temp id or, failing that, by content within the timestamp window.
    pub fn reconcile(&self, scope: &HistoryScope, temp_id: i64, confirmed: Message) {
        let mut logs = self.logs.write();
        let log = logs.entry(scope.key().to_string()).or_default();

        if log.iter().any(|m| m.id == confirmed.id) {
            log.retain(|m| m.id != temp_id);
            return;
        }
        if let Some(pos) = log.iter().position(|m| m.id == temp_id) {
            log[pos] = confirmed;
            return;
        }
        let fallback = log.iter().position(|m| {
            m.is_optimistic()
                && m.content == confirmed.content
                && (confirmed.timestamp - m.timestamp).num_seconds().abs() <= RECONCILE_WINDOW_SECS
        });
        match fallback {
            Some(pos) => log[pos] = confirmed,
            None => log.push(confirmed),
        }
    }

    /// Overwrite a message's delivery status in every log it appears in (a
    /// message can live in both a room log and the global feed). Last write
    /// wins; the server is the source of truth and regressions are accepted,
    /// not clamped.
    pub fn apply_status(&self, message_id: i64, status: DeliveryStatus) -> bool {
        let mut logs = self.logs.write();
        let mut updated = false;
        for log in logs.values_mut() {
            if let Some(msg) = log.iter_mut().find(|m| m.id == message_id) {
                msg.status = status;
                updated = true;
            }
        }
        updated
    }

    /// Upsert a user's reaction on a message in every log it appears in,
    /// last writer wins per user.
    pub fn apply_reaction(&self, message_id: i64, user_id: UserId, reaction: String) -> bool {
        let mut logs = self.logs.write();
        let mut updated = false;
        for log in logs.values_mut() {
            if let Some(msg) = log.iter_mut().find(|m| m.id == message_id) {
                msg.reactions.insert(user_id, reaction.clone());
                updated = true;
            }
        }
        updated
    }

    /// Hard-remove a message from every log it appears in.
    pub fn remove(&self, message_id: i64) -> bool {
        let mut logs = self.logs.write();
        let mut removed = false;
        for log in logs.values_mut() {
            let before = log.len();
            log.retain(|m| m.id != message_id);
            removed |= log.len() != before;
        }
        removed
    }

    /// All messages in a scope, in insertion order.
    pub fn messages(&self, scope: &HistoryScope) -> Vec<Message> {
        self.logs
            .read()
            .get(scope.key())
            .cloned()
            .unwrap_or_default()
    }

    /// Messages visible in a conversation view: room-key match, with a
    /// sender/receiver-pair fallback for records the backend left without a
    /// usable room key. The room key is the canonical rule; the pair match
    /// is a compatibility shim and only recovers keyless records the scanned
    /// scope's log actually holds, which in practice means the global feed.
    /// Per-room routing buckets a keyless live message under its own empty
    /// scope, out of reach of any room's log.
    pub fn visible(
        &self,
        scope: &HistoryScope,
        room: &RoomKey,
        me: UserId,
        counterparty: UserId,
    ) -> Vec<Message> {
        self.messages(scope)
            .into_iter()
            .filter(|m| {
                m.room == *room
                    || (m.sender == me && m.receiver == counterparty)
                    || (m.sender == counterparty && m.receiver == me)
            })
            .collect()
    }
}
