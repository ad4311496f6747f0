//! Shared test doubles: an in-memory live transport and a scriptable API.
#![allow(dead_code)]

use admit_client::error::{ClientError, Result};
use admit_client::store::HistoryScope;
use admit_client::transport::{LiveConn, LiveTransport};
use admit_client::AdmissionApi;
use admit_wire::{ClientEvent, DeliveryStatus, Message, Notification, RoomKey, ServerEvent, UserId};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// In-memory transport. Tests flip `set_accepting` to script handshake
/// failures, inject server events, and inspect what the client emitted.
pub struct MemoryTransport {
    accepting: AtomicBool,
    pub attempts: AtomicU32,
    inject_tx: Mutex<Option<mpsc::UnboundedSender<ServerEvent>>>,
    sent: Arc<Mutex<Vec<ClientEvent>>>,
}

impl MemoryTransport {
    pub fn new(accepting: bool) -> Arc<Self> {
        Arc::new(MemoryTransport {
            accepting: AtomicBool::new(accepting),
            attempts: AtomicU32::new(0),
            inject_tx: Mutex::new(None),
            sent: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Push a server event into the active connection.
    pub fn inject(&self, event: ServerEvent) {
        if let Some(tx) = self.inject_tx.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Drop the injection side so the active connection sees a server
    /// close.
    pub fn inject_close(&self) {
        self.inject_tx.lock().take();
    }

    /// Everything the client emitted over the live channel so far.
    pub fn sent(&self) -> Vec<ClientEvent> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl LiveTransport for MemoryTransport {
    async fn connect(&self, _url: &str, _token: &str) -> Result<Box<dyn LiveConn>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inject_tx.lock() = Some(tx);
        Ok(Box::new(MemoryConn {
            rx,
            sent: self.sent.clone(),
        }))
    }
}

struct MemoryConn {
    rx: mpsc::UnboundedReceiver<ServerEvent>,
    sent: Arc<Mutex<Vec<ClientEvent>>>,
}

#[async_trait]
impl LiveConn for MemoryConn {
    async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        self.sent.lock().push(event.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<ServerEvent>> {
        self.rx.recv().await.map(Ok)
    }
}

/// Scriptable durable API.
pub struct MockApi {
    pub history: Mutex<Vec<Message>>,
    pub notifications: Mutex<HashMap<UserId, Vec<Notification>>>,
    pub fail_sends: AtomicBool,
    next_id: AtomicI64,
    pub notification_fetches: AtomicU32,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(MockApi {
            history: Mutex::new(Vec::new()),
            notifications: Mutex::new(HashMap::new()),
            fail_sends: AtomicBool::new(false),
            next_id: AtomicI64::new(501),
            notification_fetches: AtomicU32::new(0),
        })
    }

    pub fn push_notification(&self, notification: Notification) {
        self.notifications
            .lock()
            .entry(notification.recipient)
            .or_default()
            .push(notification);
    }
}

#[async_trait]
impl AdmissionApi for MockApi {
    async fn fetch_history(&self, _scope: &HistoryScope) -> Result<Vec<Message>> {
        Ok(self.history.lock().clone())
    }

    async fn send_message(
        &self,
        room: &RoomKey,
        content: &str,
        sender: UserId,
        receiver: UserId,
    ) -> Result<Message> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                message: "send rejected".to_string(),
            });
        }
        Ok(Message {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            room: room.clone(),
            sender,
            receiver,
            content: content.to_string(),
            timestamp: Utc::now(),
            status: DeliveryStatus::Sent,
            reactions: HashMap::new(),
            deleted: false,
        })
    }

    async fn set_reaction(&self, _message_id: i64, _reaction: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _message_id: i64) -> Result<()> {
        Ok(())
    }

    async fn fetch_notifications(&self, user: UserId) -> Result<Vec<Notification>> {
        self.notification_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .notifications
            .lock()
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_read(&self, notification_id: i64) -> Result<()> {
        let mut all = self.notifications.lock();
        for list in all.values_mut() {
            for n in list.iter_mut() {
                if n.id == notification_id {
                    n.read = true;
                }
            }
        }
        Ok(())
    }

    async fn mark_all_read(&self, user: UserId) -> Result<()> {
        if let Some(list) = self.notifications.lock().get_mut(&user) {
            for n in list.iter_mut() {
                n.read = true;
            }
        }
        Ok(())
    }
}

/// Poll a condition until it holds or the timeout elapses.
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
