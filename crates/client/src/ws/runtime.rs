//! Application-lifetime chat state.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::connection::{Connector, TransportHandle, WebSocketConnector};
use super::relay::RelayBus;
use crate::clock::{Clock, SystemClock};
use crate::config::ChatConfig;

static GLOBAL: OnceCell<ChatRuntime> = OnceCell::new();

/// The shared transport, its relay and the config they were built from.
///
/// Cheap to clone; every clone points at the same transport and relay. The
/// app acquires one through [`ChatRuntime::global`] and hands it down via
/// context; it is never torn down.
#[derive(Clone)]
pub struct ChatRuntime {
    transport: Arc<TransportHandle>,
    relay: Arc<RelayBus>,
    config: Arc<ChatConfig>,
    clock: Arc<dyn Clock>,
}

impl ChatRuntime {
    pub fn new(config: ChatConfig, connector: Arc<dyn Connector>, clock: Arc<dyn Clock>) -> Self {
        let transport = Arc::new(TransportHandle::new(config.socket_url.clone(), connector));
        let relay = RelayBus::new(clock.clone());
        Self {
            transport,
            relay,
            config: Arc::new(config),
            clock,
        }
    }

    /// The process runtime. Built on first call, then returned forever.
    pub fn global() -> &'static ChatRuntime {
        GLOBAL.get_or_init(|| {
            let config = ChatConfig::load();
            let connector = WebSocketConnector::new(config.reconnect.clone());
            crate::log_info!("chat runtime created for {}", config.socket_url);
            ChatRuntime::new(config, Arc::new(connector), Arc::new(SystemClock::default()))
        })
    }

    pub fn transport(&self) -> &Arc<TransportHandle> {
        &self.transport
    }

    pub fn relay(&self) -> &Arc<RelayBus> {
        &self.relay
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

impl PartialEq for ChatRuntime {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_runtime_is_a_singleton() {
        let first = ChatRuntime::global();
        let second = ChatRuntime::global();
        assert!(std::ptr::eq(first, second));
        assert!(Arc::ptr_eq(first.transport(), second.transport()));
        assert!(first.clone() == *second);
    }
}
