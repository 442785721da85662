//! Live market event channel
//!
//! WebSocket subscription to the market topic. Connects on demand, decodes
//! each text frame and forwards the event to the view actor. Reconnection
//! is the caller's responsibility; a dropped transport simply parks the
//! channel back in the disconnected state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::events::decode_frame;
use crate::service::MarketViewHandle;

/// Transport state of the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Where and what to subscribe to.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub ws_url: String,
    pub topic: String,
    pub connect_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8081/ws".to_string(),
            topic: "/topic/market".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("timed out connecting to {url}")]
    ConnectTimeout { url: String },
}

#[derive(Serialize)]
struct SubscribeFrame<'a> {
    action: &'a str,
    destination: &'a str,
}

/// Push side of the market view: owns the socket reader task.
pub struct LiveChannel {
    config: ChannelConfig,
    handle: MarketViewHandle,
    status: Arc<Mutex<ConnectionStatus>>,
    reader: Option<JoinHandle<()>>,
}

impl LiveChannel {
    pub fn new(config: ChannelConfig, handle: MarketViewHandle) -> Self {
        Self {
            config,
            handle,
            status: Arc::new(Mutex::new(ConnectionStatus::Disconnected)),
            reader: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(status: &Arc<Mutex<ConnectionStatus>>, next: ConnectionStatus) {
        *status.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Connect and subscribe to the market topic. Calling while already
    /// connecting or connected is a no-op.
    pub async fn connect(&mut self) -> Result<(), ChannelError> {
        if self.status() != ConnectionStatus::Disconnected {
            debug!(status = ?self.status(), "Connect skipped, channel already active");
            return Ok(());
        }
        Self::set_status(&self.status, ConnectionStatus::Connecting);

        let url = self.config.ws_url.clone();
        let connected = match timeout(self.config.connect_timeout, connect_async(&url)).await {
            Ok(Ok((socket, _response))) => socket,
            Ok(Err(err)) => {
                Self::set_status(&self.status, ConnectionStatus::Disconnected);
                return Err(err.into());
            }
            Err(_) => {
                Self::set_status(&self.status, ConnectionStatus::Disconnected);
                return Err(ChannelError::ConnectTimeout { url });
            }
        };

        let mut socket = connected;
        let subscribe = SubscribeFrame {
            action: "SUBSCRIBE",
            destination: &self.config.topic,
        };
        let frame = serde_json::to_string(&subscribe)
            .unwrap_or_else(|_| String::from(r#"{"action":"SUBSCRIBE"}"#));
        if let Err(err) = socket.send(Message::Text(frame)).await {
            Self::set_status(&self.status, ConnectionStatus::Disconnected);
            return Err(err.into());
        }

        info!(%url, topic = %self.config.topic, "Live market channel connected");
        Self::set_status(&self.status, ConnectionStatus::Connected);

        let status = self.status.clone();
        let handle = self.handle.clone();
        self.reader = Some(tokio::spawn(async move {
            read_loop(socket, handle).await;
            Self::set_status(&status, ConnectionStatus::Disconnected);
            info!("Live market channel disconnected");
        }));

        Ok(())
    }

    /// Tear the channel down. After this returns, no further events reach
    /// the view actor. Safe to call from any state.
    pub async fn disconnect(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
            let _ = reader.await;
        }
        Self::set_status(&self.status, ConnectionStatus::Disconnected);
    }
}

async fn read_loop(
    mut socket: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    handle: MarketViewHandle,
) {
    while let Some(message) = socket.next().await {
        match message {
            Ok(Message::Text(payload)) => match decode_frame(&payload) {
                Ok(Some(event)) => {
                    if handle.send_event(event).await.is_err() {
                        debug!("View actor gone, stopping channel reader");
                        break;
                    }
                }
                Ok(None) => debug!("Ignoring unrecognized market frame"),
                Err(err) => warn!(error = %err, "Dropping malformed market frame"),
            },
            Ok(Message::Ping(payload)) => {
                if socket.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                debug!("Server closed the market channel");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "Market channel transport error");
                break;
            }
        }
    }
}
