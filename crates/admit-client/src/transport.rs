//! Live-channel transport abstraction.
//!
//! The connection manager talks to a `LiveTransport` rather than a concrete
//! socket so tests can drive it with an in-memory implementation. The
//! production implementation is a websocket carrying JSON text frames.

use crate::error::{ClientError, Result};
use admit_wire::{ClientEvent, ServerEvent};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// One established live connection.
#[async_trait]
pub trait LiveConn: Send {
    async fn send(&mut self, event: &ClientEvent) -> Result<()>;

    /// Next decoded inbound event. `None` means the peer closed the
    /// connection; malformed frames are dropped, not surfaced.
    async fn recv(&mut self) -> Option<Result<ServerEvent>>;
}

/// Abstraction for establishing live connections.
#[async_trait]
pub trait LiveTransport: Send + Sync + 'static {
    /// Open a connection, passing the session token in the handshake.
    async fn connect(&self, url: &str, token: &str) -> Result<Box<dyn LiveConn>>;
}

/// Websocket transport used in production.
pub struct WsTransport;

#[async_trait]
impl LiveTransport for WsTransport {
    async fn connect(&self, url: &str, token: &str) -> Result<Box<dyn LiveConn>> {
        let sep = if url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}token={}", url, sep, token);
        let (stream, _response) = connect_async(&url)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Box::new(WsConn { inner: stream }))
    }
}

struct WsConn {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl LiveConn for WsConn {
    async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let text = event.to_json()?;
        self.inner
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<ServerEvent>> {
        loop {
            match self.inner.next().await? {
                Ok(WsMessage::Text(text)) => match ServerEvent::parse(text.as_str()) {
                    Ok(event) => return Some(Ok(event)),
                    Err(e) => {
                        debug!("[Live] Dropping malformed frame: {}", e);
                        continue;
                    }
                },
                Ok(WsMessage::Close(_)) => return None,
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => continue,
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::Transport(e.to_string()))),
            }
        }
    }
}
