//! Session-scoped connection sharing.
//!
//! Multiple UI surfaces (header notification panel, embedded chat widget,
//! admin chat screen) share one physical connection per session. Surfaces
//! acquire a handle on mount and drop it on unmount; the last drop tears the
//! connection down.

use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::transport::LiveTransport;
use admit_wire::{Session, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::debug;

struct PoolEntry {
    manager: Arc<ConnectionManager>,
    refs: usize,
}

/// Reference-counted connection managers keyed by session identity.
pub struct ConnectionPool {
    config: ClientConfig,
    transport: Arc<dyn LiveTransport>,
    entries: Mutex<HashMap<UserId, PoolEntry>>,
}

impl ConnectionPool {
    pub fn new(config: ClientConfig, transport: Arc<dyn LiveTransport>) -> Arc<Self> {
        Arc::new(ConnectionPool {
            config,
            transport,
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Acquire a handle to the session's connection, connecting on first
    /// acquire.
    pub fn acquire(self: &Arc<Self>, session: &Session) -> ConnectionHandle {
        let mut entries = self.entries.lock();
        let entry = entries.entry(session.user_id).or_insert_with(|| {
            let manager = ConnectionManager::new(self.config.clone(), self.transport.clone());
            manager.connect(session);
            PoolEntry { manager, refs: 0 }
        });
        entry.refs += 1;
        debug!(
            "[Pool] Acquired connection for user {} ({} refs)",
            session.user_id, entry.refs
        );
        ConnectionHandle {
            manager: entry.manager.clone(),
            pool: Arc::downgrade(self),
            user_id: session.user_id,
        }
    }

    /// Number of live connections in the pool.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn release(&self, user_id: UserId) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(&user_id) {
            entry.refs -= 1;
            debug!("[Pool] Released connection for user {} ({} refs)", user_id, entry.refs);
            if entry.refs == 0 {
                entry.manager.disconnect();
                entries.remove(&user_id);
            }
        }
    }
}

/// RAII handle to a pooled connection.
pub struct ConnectionHandle {
    manager: Arc<ConnectionManager>,
    pool: Weak<ConnectionPool>,
    user_id: UserId,
}

impl ConnectionHandle {
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.release(self.user_id);
        }
    }
}
