//! The process-wide chat transport.
//!
//! [`TransportHandle`] owns the single connection to the chat backend. The
//! actual socket work is done by a platform [`Connector`] (tokio-tungstenite
//! natively, `web_sys::WebSocket` in the browser), which also owns the
//! reconnect policy. The handle only tracks state, fans decoded inbound
//! events out to its listeners and forwards outbound frames while connected.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use courier_chat_shared::{ClientCommand, ProtocolError, ServerEvent};
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use thiserror::Error;

/// Connection state of the chat transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Configuration for the driver's auto-reconnect behavior
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Maximum number of reconnect attempts (0 = infinite)
    pub max_attempts: u32,
    /// Initial delay in milliseconds
    pub initial_delay_ms: u32,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u32,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 1.5,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number
    pub fn delay_for_attempt(&self, attempt: u32) -> u32 {
        let delay = self.initial_delay_ms as f32 * self.backoff_multiplier.powi(attempt as i32);
        (delay as u32).min(self.max_delay_ms)
    }

    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts == 0 || attempt < self.max_attempts
    }
}

/// Something the transport observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A decoded server event.
    Server(ServerEvent),
    /// The socket went up (`true`) or down (`false`).
    ConnectionChanged(bool),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat transport is not connected")]
    NotConnected,
    #[error("chat transport outbound channel is closed")]
    ChannelClosed,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("connection failed: {0}")]
    Connect(String),
}

/// Callback receiving every inbound transport event in arrival order.
pub type InboundListener = Arc<dyn Fn(&TransportEvent) + Send + Sync>;

/// Platform socket driver.
pub trait Connector: Send + Sync + 'static {
    /// Begin driving the connection to `url` in the background.
    ///
    /// Must return without waiting for the socket. Frames queued on
    /// `outbound` are written while the socket is open; progress is reported
    /// through `link`. Reconnecting after a drop is the driver's job.
    fn start(&self, url: String, outbound: UnboundedReceiver<String>, link: TransportLink);
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Shared {
    state: Mutex<ConnectionState>,
    listeners: Mutex<Vec<InboundListener>>,
}

/// The driver's side of a [`TransportHandle`].
#[derive(Clone)]
pub struct TransportLink {
    url: String,
    shared: Arc<Shared>,
}

impl TransportLink {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.shared.state)
    }

    /// Record a state transition. Listeners hear about it only when the
    /// connected flag actually flips.
    pub fn set_state(&self, state: ConnectionState) {
        let previous = std::mem::replace(&mut *lock(&self.shared.state), state);
        if previous == state {
            return;
        }
        crate::log_debug!("chat transport {}: {:?} -> {:?}", self.url, previous, state);

        if previous.is_connected() != state.is_connected() {
            self.dispatch(&TransportEvent::ConnectionChanged(state.is_connected()));
        }
    }

    /// Decode one text frame and hand it to the listeners.
    pub fn deliver_frame(&self, text: &str) {
        match ServerEvent::from_frame(text) {
            Ok(event) => {
                crate::log_debug!("chat transport received {}", event.event_name());
                self.dispatch(&TransportEvent::Server(event));
            }
            Err(e) => crate::log_warn!("dropping undecodable chat frame: {}", e),
        }
    }

    fn dispatch(&self, event: &TransportEvent) {
        // Listeners run without the lock so they may register more listeners.
        let listeners = lock(&self.shared.listeners).clone();
        for listener in listeners {
            listener(event);
        }
    }
}

/// Handle to the one chat connection of the process.
///
/// Created lazily by [`crate::ws::ChatRuntime::global`] and never released:
/// consumers come and go, the connection stays.
pub struct TransportHandle {
    link: TransportLink,
    outbound: UnboundedSender<String>,
    pending: Mutex<Option<(UnboundedReceiver<String>, Arc<dyn Connector>)>>,
}

impl TransportHandle {
    pub fn new(url: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        let (outbound, receiver) = unbounded();
        Self {
            link: TransportLink {
                url: url.into(),
                shared: Arc::new(Shared::default()),
            },
            outbound,
            pending: Mutex::new(Some((receiver, connector))),
        }
    }

    pub fn url(&self) -> &str {
        self.link.url()
    }

    pub fn state(&self) -> ConnectionState {
        self.link.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Start the driver on first call. Later calls do nothing.
    pub fn ensure_connected(&self) {
        let Some((receiver, connector)) = lock(&self.pending).take() else {
            return;
        };
        crate::log_info!("chat transport connecting to {}", self.url());
        self.link.set_state(ConnectionState::Connecting);
        connector.start(self.url().to_string(), receiver, self.link.clone());
    }

    /// Register a listener for inbound events.
    pub fn on_inbound(&self, listener: InboundListener) {
        lock(&self.link.shared.listeners).push(listener);
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.link.shared.listeners).len()
    }

    /// Fire-and-forget send.
    ///
    /// Nothing is queued while the socket is down: the command is dropped and
    /// `NotConnected` returned.
    pub fn emit(&self, command: &ClientCommand) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let frame = command.to_frame()?;
        self.outbound
            .unbounded_send(frame)
            .map_err(|_| TransportError::ChannelClosed)
    }
}

#[cfg(test)]
pub(crate) mod memory;

// Include platform-specific implementation
#[cfg(target_arch = "wasm32")]
mod connection_wasm;
#[cfg(target_arch = "wasm32")]
pub use connection_wasm::WebSocketConnector;

#[cfg(not(target_arch = "wasm32"))]
mod connection_native;
#[cfg(not(target_arch = "wasm32"))]
pub use connection_native::WebSocketConnector;

#[cfg(test)]
mod tests {
    use super::memory::MemoryConnector;
    use super::*;
    use courier_chat_shared::TypingPayload;

    fn handle() -> (TransportHandle, MemoryConnector) {
        let connector = MemoryConnector::default();
        let handle = TransportHandle::new("ws://chat.test/ws", Arc::new(connector.clone()));
        (handle, connector)
    }

    fn recorder(handle: &TransportHandle) -> Arc<Mutex<Vec<TransportEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        handle.on_inbound(Arc::new(move |event: &TransportEvent| {
            lock(&sink).push(event.clone());
        }));
        seen
    }

    #[test]
    fn ensure_connected_starts_driver_once() {
        let (handle, connector) = handle();
        assert_eq!(handle.state(), ConnectionState::Disconnected);

        handle.ensure_connected();
        handle.ensure_connected();
        handle.ensure_connected();

        assert_eq!(connector.starts(), 1);
        assert_eq!(handle.state(), ConnectionState::Connecting);
        connector.open();
        assert!(handle.is_connected());
    }

    #[test]
    fn emit_while_disconnected_is_dropped() {
        let (handle, connector) = handle();
        handle.ensure_connected();

        let err = handle.emit(&ClientCommand::message("hello", "u1")).unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));

        connector.open();
        handle.emit(&ClientCommand::message("again", "u1")).unwrap();
        assert_eq!(connector.sent(), vec![ClientCommand::message("again", "u1")]);
    }

    #[test]
    fn connection_changes_are_reported_on_flips_only() {
        let (handle, connector) = handle();
        let seen = recorder(&handle);

        handle.ensure_connected();
        connector.open();
        connector.open();
        connector.drop_connection();

        assert_eq!(
            *lock(&seen),
            vec![
                TransportEvent::ConnectionChanged(true),
                TransportEvent::ConnectionChanged(false),
            ]
        );
    }

    #[test]
    fn inbound_frames_are_decoded_in_order_and_garbage_is_skipped() {
        let (handle, connector) = handle();
        handle.ensure_connected();
        connector.open();
        let seen = recorder(&handle);

        connector.push(&ServerEvent::Typing(TypingPayload { is_typing: true }));
        connector.push_raw("not json");
        connector.push(&ServerEvent::Typing(TypingPayload { is_typing: false }));

        assert_eq!(
            *lock(&seen),
            vec![
                TransportEvent::Server(ServerEvent::Typing(TypingPayload { is_typing: true })),
                TransportEvent::Server(ServerEvent::Typing(TypingPayload { is_typing: false })),
            ]
        );
    }

    #[test]
    fn reconnect_delay_grows_and_caps() {
        let config = ReconnectConfig::default();
        assert_eq!(config.delay_for_attempt(0), 1000);
        assert_eq!(config.delay_for_attempt(1), 1500);
        assert_eq!(config.delay_for_attempt(30), 30000);
        assert!(config.allows_attempt(9));
        assert!(!config.allows_attempt(10));

        let unlimited = ReconnectConfig {
            max_attempts: 0,
            ..ReconnectConfig::default()
        };
        assert!(unlimited.allows_attempt(u32::MAX));
    }
}
