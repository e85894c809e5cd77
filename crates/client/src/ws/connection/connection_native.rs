//! Native/Desktop WebSocket driver using tokio-tungstenite.

use futures_channel::mpsc::UnboundedReceiver;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{ConnectionState, Connector, ReconnectConfig, TransportError, TransportLink};

/// Drives the chat socket on the ambient tokio runtime, or on a dedicated
/// thread when started outside one.
#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector {
    reconnect: ReconnectConfig,
}

impl WebSocketConnector {
    pub fn new(reconnect: ReconnectConfig) -> Self {
        Self { reconnect }
    }
}

impl Connector for WebSocketConnector {
    fn start(&self, url: String, outbound: UnboundedReceiver<String>, link: TransportLink) {
        let task = connection_loop(url, outbound, link.clone(), self.reconnect.clone());
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(task);
            return;
        }

        // Started outside any runtime: give the socket a thread of its own.
        crate::log_debug!("no ambient tokio runtime, driving chat socket on its own thread");
        let thread_link = link.clone();
        let spawned = std::thread::Builder::new()
            .name("courier-chat-socket".to_string())
            .spawn(move || {
                match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(task),
                    Err(e) => {
                        crate::log_error!("cannot build chat socket runtime: {}", e);
                        thread_link.set_state(ConnectionState::Disconnected);
                    }
                }
            });
        if let Err(e) = spawned {
            crate::log_error!("cannot spawn chat socket thread: {}", e);
            link.set_state(ConnectionState::Disconnected);
        }
    }
}

type SocketStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(url: &str) -> Result<SocketStream, TransportError> {
    connect_async(url)
        .await
        .map(|(ws_stream, _response)| ws_stream)
        .map_err(|e| TransportError::Connect(e.to_string()))
}

/// Why a connected session ended.
enum SessionEnd {
    /// Socket closed or errored; reconnect.
    Dropped,
    /// The transport handle is gone; stop for good.
    HandleDropped,
}

async fn connection_loop(
    url: String,
    mut outbound: UnboundedReceiver<String>,
    link: TransportLink,
    reconnect: ReconnectConfig,
) {
    let mut attempt = 0u32;

    loop {
        link.set_state(ConnectionState::Connecting);

        match connect(&url).await {
            Ok(ws_stream) => {
                link.set_state(ConnectionState::Connected);
                attempt = 0;
                crate::log_info!("chat socket connected to {}", url);

                let end = run_session(ws_stream, &mut outbound, &link).await;

                link.set_state(ConnectionState::Disconnected);
                discard_stale(&mut outbound);
                crate::log_info!("chat socket to {} closed", url);

                if let SessionEnd::HandleDropped = end {
                    return;
                }
            }
            Err(e) => {
                link.set_state(ConnectionState::Disconnected);
                crate::log_error!("chat socket for {}: {}", url, e);

                if !reconnect.allows_attempt(attempt) {
                    crate::log_error!(
                        "giving up on {} after {} reconnect attempts",
                        url,
                        reconnect.max_attempts
                    );
                    return;
                }

                let delay = reconnect.delay_for_attempt(attempt);
                crate::log_info!(
                    "Reconnecting to {} in {}ms (attempt {})",
                    url,
                    delay,
                    attempt + 1
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(delay as u64)).await;
                attempt += 1;
            }
        }
    }
}

async fn run_session<S>(
    ws_stream: tokio_tungstenite::WebSocketStream<S>,
    outbound: &mut UnboundedReceiver<String>,
    link: &TransportLink,
) -> SessionEnd
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => link.deliver_frame(text.as_str()),
                Some(Ok(Message::Close(_))) | None => {
                    crate::log_info!("chat socket {} received close", link.url());
                    return SessionEnd::Dropped;
                }
                Some(Ok(Message::Ping(data))) => {
                    // Pong is handled automatically by tungstenite
                    crate::log_debug!("Received ping: {:?}", data);
                }
                Some(Ok(_)) => {
                    // Ignore binary, pong, etc.
                }
                Some(Err(e)) => {
                    crate::log_error!("chat socket read error: {}", e);
                    return SessionEnd::Dropped;
                }
            },
            frame = outbound.next() => match frame {
                Some(frame) => {
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        crate::log_error!("Send failed: {}", e);
                        return SessionEnd::Dropped;
                    }
                }
                None => {
                    let _ = write.close().await;
                    return SessionEnd::HandleDropped;
                }
            },
        }
    }
}

/// Frames emitted around a drop are not carried over to the next socket.
fn discard_stale(outbound: &mut UnboundedReceiver<String>) {
    let mut dropped = 0usize;
    while let Ok(Some(_)) = outbound.try_next() {
        dropped += 1;
    }
    if dropped > 0 {
        crate::log_warn!("discarded {} chat frames queued across a disconnect", dropped);
    }
}
