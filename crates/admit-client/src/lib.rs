//! Realtime chat and notification client for the Admitlink admission
//! portal.
//!
//! The client is a pure consumer of a server it does not define: durable
//! state goes over REST, live delivery over a websocket. The two channels
//! race freely; reconciliation is id-based and best-effort.

pub mod api;
pub mod cache;
pub mod client;
pub mod composer;
pub mod config;
pub mod connection;
pub mod error;
pub mod notifications;
pub mod presence;
pub mod rooms;
pub mod session;
pub mod store;
pub mod transport;

pub use api::{AdmissionApi, HttpApi};
pub use cache::TtlCache;
pub use client::ChatClient;
pub use composer::{Composer, SendPolicy};
pub use config::ClientConfig;
pub use connection::{ConnectionManager, ConnectionState};
pub use error::{ClientError, Result};
pub use notifications::NotificationFeed;
pub use presence::{PresenceTracker, TypingAnnouncer};
pub use rooms::{RoomRegistry, SubscriptionStrategy};
pub use session::{ConnectionHandle, ConnectionPool};
pub use store::{HistoryScope, MessageStore};
pub use transport::{LiveConn, LiveTransport, WsTransport};
