//! Connection lifecycle management.
//!
//! Owns one live transport per session: auth handshake, bounded reconnect,
//! idempotent teardown. Inbound events fan out over a broadcast channel to
//! whatever components subscribe; outbound emissions are dropped while the
//! connection is not open, so callers needing at-least-once delivery must
//! use the durable REST path.

use crate::config::ClientConfig;
use crate::transport::{LiveConn, LiveTransport};
use admit_wire::{ClientEvent, ServerEvent, Session};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Reconnecting,
    /// Terminal until an explicit `reconnect` trigger.
    Closed,
}

/// Manages the single live connection for one session.
pub struct ConnectionManager {
    config: ClientConfig,
    transport: Arc<dyn LiveTransport>,
    state: RwLock<ConnectionState>,
    outbound: RwLock<Option<mpsc::Sender<ClientEvent>>>,
    events: broadcast::Sender<ServerEvent>,
    shutdown: watch::Sender<bool>,
    running: AtomicBool,
}

impl ConnectionManager {
    pub fn new(config: ClientConfig, transport: Arc<dyn LiveTransport>) -> Arc<Self> {
        let (events, _) = broadcast::channel(config.event_buffer);
        let (shutdown, _) = watch::channel(false);
        Arc::new(ConnectionManager {
            config,
            transport,
            state: RwLock::new(ConnectionState::Idle),
            outbound: RwLock::new(None),
            events,
            shutdown,
            running: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Subscribe to inbound server events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Start the connection run loop. A no-op while a run loop is already
    /// active: exactly one transport exists per session.
    pub fn connect(self: &Arc<Self>, session: &Session) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("[Live] connect() ignored, run loop already active");
            return;
        }
        // send_replace: a plain send() drops the value when no receiver is
        // alive, leaving a stale `true` from a prior disconnect.
        self.shutdown.send_replace(false);
        *self.state.write() = ConnectionState::Connecting;
        let manager = self.clone();
        let session = session.clone();
        tokio::spawn(async move {
            run(manager, session).await;
        });
    }

    /// Manual trigger after the retry loop gave up or an explicit
    /// disconnect. Does nothing unless the connection is `Closed`.
    pub fn reconnect(self: &Arc<Self>, session: &Session) {
        if self.state() == ConnectionState::Closed {
            info!("[Live] Manual reconnect for user {}", session.user_id);
            self.connect(session);
        }
    }

    /// Tear down the connection. Idempotent.
    pub fn disconnect(&self) {
        *self.state.write() = ConnectionState::Closed;
        self.outbound.write().take();
        self.shutdown.send_replace(true);
    }

    /// Emit a live event. Returns false (dropping the event) while the
    /// connection is not open; nothing is queued.
    pub async fn emit(&self, event: ClientEvent) -> bool {
        if !self.is_open() {
            debug!("[Live] Dropping outbound event while not open");
            return false;
        }
        let tx = self.outbound.read().clone();
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.write() = next;
    }
}

async fn run(manager: Arc<ConnectionManager>, session: Session) {
    let delay = Duration::from_millis(manager.config.reconnect_delay_ms);
    let mut shutdown = manager.shutdown.subscribe();
    let mut attempts: u32 = 0;

    loop {
        if manager.state() == ConnectionState::Closed {
            break;
        }
        manager.set_state(if attempts == 0 {
            ConnectionState::Connecting
        } else {
            ConnectionState::Reconnecting
        });

        match manager
            .transport
            .connect(&manager.config.live_url, &session.token)
            .await
        {
            Ok(conn) => {
                attempts = 0;
                let (tx, rx) = mpsc::channel(manager.config.event_buffer);
                *manager.outbound.write() = Some(tx);
                manager.set_state(ConnectionState::Open);
                info!("[Live] Connection open for user {}", session.user_id);

                drive(&manager, conn, rx, &mut shutdown).await;

                manager.outbound.write().take();
                if manager.state() == ConnectionState::Closed {
                    break;
                }
                manager.set_state(ConnectionState::Reconnecting);
            }
            Err(e) => {
                // Handshake rejections are not surfaced beyond the log; the
                // caller sees the same bounded retry loop as any other
                // transport failure.
                warn!("[Live] Handshake failed: {}", e);
                if manager.state() == ConnectionState::Closed {
                    break;
                }
            }
        }

        attempts += 1;
        if attempts >= manager.config.max_reconnect_attempts {
            warn!(
                "[Live] Giving up after {} attempts; manual reconnect required",
                attempts
            );
            manager.set_state(ConnectionState::Closed);
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => {}
        }
    }

    manager.outbound.write().take();
    manager.running.store(false, Ordering::SeqCst);
}

/// Pump one open connection until a transport error, server close, or
/// shutdown signal.
async fn drive(
    manager: &ConnectionManager,
    mut conn: Box<dyn LiveConn>,
    mut outbound: mpsc::Receiver<ClientEvent>,
    shutdown: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        tokio::select! {
            _ = shutdown.changed() => {}
            out = outbound.recv() => match out {
                Some(event) => {
                    if let Err(e) = conn.send(&event).await {
                        warn!("[Live] Send failed: {}", e);
                        return;
                    }
                }
                None => return,
            },
            inbound = conn.recv() => match inbound {
                Some(Ok(event)) => {
                    if manager.events.send(event).is_err() {
                        debug!("[Live] No subscribers for inbound event");
                    }
                }
                Some(Err(e)) => {
                    warn!("[Live] Transport error: {}", e);
                    return;
                }
                None => {
                    info!("[Live] Server closed connection");
                    return;
                }
            },
        }
    }
}
