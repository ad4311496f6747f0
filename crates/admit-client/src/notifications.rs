//! Notification feed with a TTL cache and toast side effects.
//!
//! Fetches within the TTL are served from cache without a network call.
//! Mark-read mutations invalidate and force a refetch rather than editing
//! the cached collection. The unread count is always derived, never stored.

use crate::api::AdmissionApi;
use crate::cache::TtlCache;
use crate::error::Result;
use admit_wire::{Notification, UserId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Cached, push-invalidated notification collection per recipient.
pub struct NotificationFeed {
    api: Arc<dyn AdmissionApi>,
    cache: TtlCache<UserId, Vec<Notification>>,
    toasted: Mutex<HashSet<i64>>,
    toasts: mpsc::UnboundedSender<Notification>,
}

impl NotificationFeed {
    /// Create the feed and the receiving end of its toast channel.
    pub fn new(
        api: Arc<dyn AdmissionApi>,
        ttl: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        let (toasts, toast_rx) = mpsc::unbounded_channel();
        let feed = Arc::new(NotificationFeed {
            api,
            cache: TtlCache::new(ttl),
            toasted: Mutex::new(HashSet::new()),
            toasts,
        });
        (feed, toast_rx)
    }

    /// The recipient's notifications, newest first. Served from cache within
    /// the TTL.
    pub async fn fetch(&self, user: UserId) -> Result<Vec<Notification>> {
        if let Some(cached) = self.cache.get(&user) {
            return Ok(cached);
        }
        let fresh = self.api.fetch_notifications(user).await?;
        self.cache.insert(user, fresh.clone());
        Ok(fresh)
    }

    /// Force the next `fetch` to bypass the cache.
    pub fn invalidate(&self, user: UserId) {
        self.cache.remove(&user);
    }

    /// Durable mark-read, then invalidate. The cached collection is never
    /// edited optimistically; a refetch picks up the new state.
    pub async fn mark_read(&self, notification_id: i64, user: UserId) -> Result<()> {
        self.api.mark_read(notification_id).await?;
        self.invalidate(user);
        Ok(())
    }

    pub async fn mark_all_read(&self, user: UserId) -> Result<()> {
        self.api.mark_all_read(user).await?;
        self.invalidate(user);
        Ok(())
    }

    /// Unread count derived from the cached collection; 0 when nothing is
    /// cached.
    pub fn unread_count(&self, user: UserId) -> usize {
        self.cache
            .get(&user)
            .map(|ns| ns.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// Handle a pushed notification: invalidate the cache and fire a toast
    /// for unread, non-empty bodies. Toasts are deduplicated by id so
    /// reconnect replays stay silent.
    pub fn handle_push(&self, notification: Notification) {
        self.invalidate(notification.recipient);
        if notification.message.is_empty() || notification.read {
            return;
        }
        if self.toasted.lock().insert(notification.id) {
            if self.toasts.send(notification).is_err() {
                debug!("[Notify] Toast receiver dropped");
            }
        }
    }
}
