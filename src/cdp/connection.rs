//! CDP WebSocket connection implementation
//!
//! This module provides WebSocket-based connection to Chrome DevTools Protocol.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_tungstenite::{connect_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

type WsStream = WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingCommand>>>;

/// CDP timeout configuration
#[derive(Debug, Clone)]
pub struct CdpTimeoutConfig {
    /// Default timeout for most commands (milliseconds)
    pub default_timeout_ms: u64,
    /// Timeout for page navigation commands (milliseconds)
    pub navigation_timeout_ms: u64,
}

impl Default for CdpTimeoutConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            navigation_timeout_ms: 60_000,
        }
    }
}

impl CdpTimeoutConfig {
    /// Timeouts derived from a single default command timeout
    pub fn with_default(default_timeout_ms: u64) -> Self {
        Self {
            default_timeout_ms,
            navigation_timeout_ms: default_timeout_ms.saturating_mul(2),
        }
    }

    /// Get timeout duration for a specific command method
    fn get_timeout_for_command(&self, method: &str) -> tokio::time::Duration {
        let method_lower = method.to_lowercase();

        if method_lower.starts_with("page.navigate") || method_lower.contains("reload") {
            return tokio::time::Duration::from_millis(self.navigation_timeout_ms);
        }

        tokio::time::Duration::from_millis(self.default_timeout_ms)
    }
}

/// WebSocket connection state
#[derive(Debug, Clone, Copy, PartialEq)]
enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: tokio::sync::oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// WebSocket stream
    ws_stream: Arc<Mutex<Option<WsStream>>>,
    /// Connection state
    state: Arc<RwLock<ConnectionState>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: PendingMap,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Timeout configuration
    timeout_config: CdpTimeoutConfig,
}

impl CdpWebSocketConnection {
    /// Create a new CDP WebSocket connection
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    /// * `timeout_config` - Per-command timeouts
    pub async fn new<S: Into<String>>(url: S, timeout_config: CdpTimeoutConfig) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Creating CDP WebSocket connection to {}", url);

        let connection = Arc::new(Self {
            url,
            ws_stream: Arc::new(Mutex::new(None)),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            next_id: AtomicU64::new(1),
            pending_commands: Arc::new(Mutex::new(HashMap::new())),
            is_active: Arc::new(AtomicBool::new(false)),
            timeout_config,
        });

        connection.connect().await?;

        Ok(connection)
    }

    /// Establish WebSocket connection
    async fn connect(&self) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != ConnectionState::Disconnected {
            return Err(Error::internal("Connection is not in disconnected state"));
        }

        *state = ConnectionState::Connecting;
        drop(state);

        match connect_async(&self.url).await {
            Ok((ws_stream, _)) => {
                *self.ws_stream.lock().await = Some(ws_stream);

                *self.state.write().await = ConnectionState::Connected;
                self.is_active.store(true, Ordering::SeqCst);

                info!("WebSocket connection established");

                let ws_stream = Arc::clone(&self.ws_stream);
                let pending_commands = Arc::clone(&self.pending_commands);
                let is_active = Arc::clone(&self.is_active);

                tokio::spawn(async move {
                    if let Err(e) = Self::message_loop(ws_stream, pending_commands, is_active).await {
                        error!("Message loop error: {}", e);
                    }
                    debug!("Message loop task exited");
                });

                Ok(())
            }
            Err(e) => {
                *self.state.write().await = ConnectionState::Disconnected;
                Err(Error::websocket(format!("Failed to connect: {}", e)))
            }
        }
    }

    /// Message processing loop
    ///
    /// Uses try_lock and a short receive timeout so `send_command` can take
    /// the stream between reads.
    async fn message_loop(
        ws_stream: Arc<Mutex<Option<WsStream>>>,
        pending_commands: PendingMap,
        is_active: Arc<AtomicBool>,
    ) -> Result<(), Error> {
        while is_active.load(Ordering::SeqCst) {
            let mut stream_guard = match ws_stream.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    tokio::task::yield_now().await;
                    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                    continue;
                }
            };

            let ws_stream_ref = match stream_guard.as_mut() {
                Some(stream) => stream,
                None => {
                    warn!("WebSocket stream not available");
                    drop(stream_guard);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            let message_result = tokio::time::timeout(
                tokio::time::Duration::from_millis(100),
                ws_stream_ref.next(),
            )
            .await;

            drop(stream_guard);

            match message_result {
                Ok(Some(Ok(msg))) => match msg {
                    Message::Text(text) => {
                        if let Err(e) = Self::handle_message(&text, &pending_commands).await {
                            error!("Error handling message: {}", e);
                        }
                    }
                    Message::Close(_) => {
                        info!("WebSocket close frame received");
                        break;
                    }
                    Message::Ping(data) => {
                        let mut stream_guard = ws_stream.lock().await;
                        if let Some(stream) = stream_guard.as_mut() {
                            if let Err(e) = stream.send(Message::Pong(data)).await {
                                error!("Failed to send pong: {}", e);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Some(Err(e))) => {
                    let error_msg = e.to_string();
                    error!("WebSocket error: {}", error_msg);

                    if error_msg.contains("ConnectionClosed")
                        || error_msg.contains("AlreadyClosed")
                        || error_msg.contains("connection closed")
                    {
                        warn!("WebSocket connection closed, deactivating connection");
                        break;
                    }

                    is_active.store(false, Ordering::SeqCst);
                    return Err(Error::websocket(format!("WebSocket error: {}", e)));
                }
                Ok(None) => {
                    warn!("WebSocket stream closed");
                    break;
                }
                Err(_) => {}
            }
        }

        is_active.store(false, Ordering::SeqCst);
        // Dropping the senders wakes every waiter with a closed channel.
        pending_commands.lock().await.clear();
        Ok(())
    }

    /// Handle incoming WebSocket message
    async fn handle_message(text: &str, pending_commands: &PendingMap) -> Result<(), Error> {
        trace!("Processing received message: {}", text);

        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            return Self::handle_response(response, pending_commands).await;
        }

        if let Ok(notification) = serde_json::from_str::<CdpNotification>(text) {
            trace!("Ignoring event: {}", notification.method);
            return Ok(());
        }

        warn!("Unknown message format: {}", text);
        Ok(())
    }

    /// Handle CDP response
    async fn handle_response(response: CdpRpcResponse, pending_commands: &PendingMap) -> Result<(), Error> {
        let mut pending = pending_commands.lock().await;

        if let Some(pending_cmd) = pending.remove(&response.id) {
            debug!("Received response for command {}: {}", response.id, pending_cmd.method);

            let cdp_response = CdpResponse {
                id: response.id,
                result: Some(response.result),
                error: response.error.map(|e| CdpErrorResponse {
                    code: e.code,
                    message: e.message,
                    data: e.data,
                }),
            };

            let _ = pending_cmd.sender.send(cdp_response);
        } else {
            warn!("Received response for unknown command ID: {}", response.id);
        }

        Ok(())
    }

    /// Send WebSocket message
    async fn send_message(&self, message: Message) -> Result<(), Error> {
        let mut stream_guard = self.ws_stream.lock().await;
        let ws_stream = stream_guard
            .as_mut()
            .ok_or_else(|| Error::websocket("WebSocket stream not available"))?;

        ws_stream
            .send(message)
            .await
            .map_err(|e| Error::websocket(format!("Failed to send message: {}", e)))
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };

        let json = serde_json::to_string(&request)
            .map_err(|e| Error::cdp(format!("Failed to serialize request: {}", e)))?;

        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = tokio::sync::oneshot::channel();

        self.pending_commands.lock().await.insert(
            id,
            PendingCommand {
                sender,
                method: method.to_string(),
            },
        );

        if let Err(e) = self.send_message(Message::Text(json)).await {
            self.pending_commands.lock().await.remove(&id);
            return Err(e);
        }

        let timeout_duration = self.timeout_config.get_timeout_for_command(method);

        match tokio::time::timeout(timeout_duration, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{}: {} (code: {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Connection closed before response to command {} ({})",
                id, method
            ))),
            Err(_) => {
                self.pending_commands.lock().await.remove(&id);
                Err(Error::timeout(format!(
                    "Command {} ({}) timed out after {:?}",
                    id, method, timeout_duration
                )))
            }
        }
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        info!("Closing CDP WebSocket connection to {}", self.url);

        self.is_active.store(false, Ordering::SeqCst);

        let mut stream_guard = self.ws_stream.lock().await;
        if let Some(ws_stream) = stream_guard.as_mut() {
            ws_stream
                .close(None)
                .await
                .map_err(|e| Error::websocket(format!("Failed to close WebSocket: {}", e)))?;
        }

        *self.state.write().await = ConnectionState::Closed;

        Ok(())
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
