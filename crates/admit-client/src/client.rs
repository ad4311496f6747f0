//! Chat client facade: wires the components together and routes inbound
//! events to them.

use crate::api::AdmissionApi;
use crate::composer::{Composer, SendPolicy};
use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::notifications::NotificationFeed;
use crate::presence::PresenceTracker;
use crate::rooms::{RoomRegistry, SubscriptionStrategy};
use crate::session::{ConnectionHandle, ConnectionPool};
use crate::store::{HistoryScope, MessageStore};
use crate::error::Result;
use admit_wire::{Notification, ServerEvent, Session};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

/// One mounted chat surface: a shared connection handle plus the per-surface
/// room registry, message store, presence tracker, notification feed and
/// composer.
pub struct ChatClient {
    session: Session,
    handle: ConnectionHandle,
    api: Arc<dyn AdmissionApi>,
    pub store: Arc<MessageStore>,
    pub presence: Arc<PresenceTracker>,
    pub feed: Arc<NotificationFeed>,
    pub rooms: Arc<RoomRegistry>,
    composer: Composer,
    strategy: SubscriptionStrategy,
}

impl ChatClient {
    /// Build a client for one surface. Returns the client plus the toast
    /// receiver for the notification side effects.
    pub fn new(
        pool: &Arc<ConnectionPool>,
        api: Arc<dyn AdmissionApi>,
        session: Session,
        config: &ClientConfig,
        strategy: SubscriptionStrategy,
        policy: SendPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let handle = pool.acquire(&session);
        let conn = handle.manager().clone();

        let store = Arc::new(MessageStore::new());
        let presence = Arc::new(PresenceTracker::new(Duration::from_millis(
            config.typing_stale_after_ms,
        )));
        let (feed, toast_rx) =
            NotificationFeed::new(api.clone(), Duration::from_secs(config.notification_ttl_secs));
        let rooms = Arc::new(RoomRegistry::new(conn.clone(), strategy));
        let composer = Composer::new(api.clone(), conn, store.clone(), policy, session.user_id);

        let client = ChatClient {
            session,
            handle,
            api,
            store,
            presence,
            feed,
            rooms,
            composer,
            strategy,
        };
        (client, toast_rx)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        self.handle.manager()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Fetch the authoritative history for a scope and replace the local
    /// log with it.
    pub async fn load_history(&self, scope: &HistoryScope) -> Result<usize> {
        let messages = self.api.fetch_history(scope).await?;
        let count = messages.len();
        self.store.replace_history(scope, messages);
        Ok(count)
    }

    /// Spawn the loop that routes inbound server events into the store,
    /// presence tracker and notification feed. Exits when the connection's
    /// event channel closes.
    pub fn spawn_event_loop(&self) -> JoinHandle<()> {
        let mut rx = self.connection().subscribe();
        let store = self.store.clone();
        let presence = self.presence.clone();
        let feed = self.feed.clone();
        let global = self.strategy == SubscriptionStrategy::GlobalFeed;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => route(event, &store, &presence, &feed, global),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("[Live] Event loop lagged, {} events skipped", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

fn route(
    event: ServerEvent,
    store: &MessageStore,
    presence: &PresenceTracker,
    feed: &NotificationFeed,
    global: bool,
) {
    match event {
        ServerEvent::Message { message } => {
            let scope = if global {
                HistoryScope::Global
            } else {
                HistoryScope::Room(message.room.clone())
            };
            store.append_live(&scope, message);
        }
        ServerEvent::Status { message_id, status } => {
            store.apply_status(message_id, status);
        }
        ServerEvent::Reaction {
            message_id,
            user_id,
            reaction,
        } => {
            store.apply_reaction(message_id, user_id, reaction);
        }
        ServerEvent::Deleted { message_id } => {
            store.remove(message_id);
        }
        ServerEvent::Typing { user_id, is_typing } => {
            presence.set_typing(user_id, is_typing);
        }
        ServerEvent::Presence { user_id, online } => {
            presence.set_online(user_id, online);
        }
        ServerEvent::Notification { notification } => {
            feed.handle_push(notification);
        }
    }
}
