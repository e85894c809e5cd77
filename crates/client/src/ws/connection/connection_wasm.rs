//! Browser WebSocket driver using `web_sys::WebSocket`.

use std::cell::RefCell;
use std::rc::Rc;

use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use futures_util::future::{select, Either};
use futures_util::StreamExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::{ConnectionState, Connector, ReconnectConfig, TransportError, TransportLink};

/// Drives the chat socket on the browser event loop.
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
        spawn_local(connection_loop(url, outbound, link, self.reconnect.clone()));
    }
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

        match connect_websocket(&url, link.clone()).await {
            Ok(ws) => {
                link.set_state(ConnectionState::Connected);
                attempt = 0;
                crate::log_info!("chat socket connected to {}", url);

                // Channel to signal when connection closes
                let (close_tx, mut close_rx) = unbounded::<()>();
                let onclose_callback = Closure::wrap(Box::new(move |_: CloseEvent| {
                    let _ = close_tx.unbounded_send(());
                }) as Box<dyn FnMut(CloseEvent)>);
                ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
                onclose_callback.forget();

                let handle_dropped = loop {
                    match select(close_rx.next(), outbound.next()).await {
                        Either::Left(_) => break false,
                        Either::Right((Some(frame), _)) => {
                            if ws.ready_state() != WebSocket::OPEN {
                                crate::log_warn!("chat socket no longer open, dropping frame");
                                break false;
                            }
                            if let Err(e) = ws.send_with_str(&frame) {
                                crate::log_error!("Send failed: {:?}", e);
                            }
                        }
                        Either::Right((None, _)) => break true,
                    }
                };

                link.set_state(ConnectionState::Disconnected);
                while let Ok(Some(_)) = outbound.try_next() {}
                crate::log_info!("chat socket to {} closed", url);

                if handle_dropped {
                    let _ = ws.close();
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
                gloo_timers::future::TimeoutFuture::new(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Open a socket and wire its message handler to `link`.
///
/// Resolves once the socket is open, or with the close/error reason.
async fn connect_websocket(url: &str, link: TransportLink) -> Result<WebSocket, TransportError> {
    let ws = WebSocket::new(url)
        .map_err(|e| TransportError::Connect(format!("cannot create WebSocket: {:?}", e)))?;

    let is_open = Rc::new(RefCell::new(false));
    let error_reason = Rc::new(RefCell::new(None::<String>));

    let is_open_clone = is_open.clone();
    let onopen_callback = Closure::wrap(Box::new(move |_: web_sys::Event| {
        *is_open_clone.borrow_mut() = true;
    }) as Box<dyn FnMut(web_sys::Event)>);
    ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
    onopen_callback.forget();

    let error_reason_close = error_reason.clone();
    let onclose_callback = Closure::wrap(Box::new(move |e: CloseEvent| {
        let reason = if e.reason().is_empty() {
            format!("Code {}", e.code())
        } else {
            e.reason()
        };
        *error_reason_close.borrow_mut() = Some(reason);
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
    onclose_callback.forget();

    let error_reason_err = error_reason.clone();
    let onerror_callback = Closure::wrap(Box::new(move |_: web_sys::ErrorEvent| {
        *error_reason_err.borrow_mut() = Some("WebSocket error".to_string());
    }) as Box<dyn FnMut(web_sys::ErrorEvent)>);
    ws.set_onerror(Some(onerror_callback.as_ref().unchecked_ref()));
    onerror_callback.forget();

    let onmessage_callback = Closure::wrap(Box::new(move |e: MessageEvent| {
        if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
            let text: String = text.into();
            link.deliver_frame(&text);
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
    onmessage_callback.forget();

    // 5 second handshake window
    for _ in 0..500 {
        if *is_open.borrow() {
            return Ok(ws);
        }
        if let Some(reason) = error_reason.borrow().clone() {
            return Err(TransportError::Connect(reason));
        }
        // Yield to allow callbacks to fire
        gloo_timers::future::TimeoutFuture::new(10).await;
    }

    Err(TransportError::Connect("handshake timed out".to_string()))
}
