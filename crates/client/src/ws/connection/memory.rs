//! In-process connector for tests: the test plays the backend.

use std::sync::{Arc, Mutex};

use courier_chat_shared::{ClientCommand, ServerEvent};
use futures_channel::mpsc::UnboundedReceiver;

use super::{lock, ConnectionState, Connector, TransportLink};

#[derive(Default)]
struct Inner {
    starts: usize,
    link: Option<TransportLink>,
    outbound: Option<UnboundedReceiver<String>>,
}

#[derive(Clone, Default)]
pub struct MemoryConnector {
    inner: Arc<Mutex<Inner>>,
}

impl Connector for MemoryConnector {
    fn start(&self, _url: String, outbound: UnboundedReceiver<String>, link: TransportLink) {
        let mut inner = lock(&self.inner);
        inner.starts += 1;
        inner.link = Some(link);
        inner.outbound = Some(outbound);
    }
}

impl MemoryConnector {
    pub fn starts(&self) -> usize {
        lock(&self.inner).starts
    }

    fn link(&self) -> TransportLink {
        lock(&self.inner)
            .link
            .clone()
            .expect("transport was never started")
    }

    /// Complete the handshake.
    pub fn open(&self) {
        self.link().set_state(ConnectionState::Connected);
    }

    /// Simulate a network drop.
    pub fn drop_connection(&self) {
        self.link().set_state(ConnectionState::Disconnected);
    }

    pub fn push(&self, event: &ServerEvent) {
        self.push_raw(&event.to_frame().expect("encode server event"));
    }

    pub fn push_raw(&self, frame: &str) {
        self.link().deliver_frame(frame);
    }

    /// Drain and decode everything the client wrote so far.
    pub fn sent(&self) -> Vec<ClientCommand> {
        let mut inner = lock(&self.inner);
        let Some(outbound) = inner.outbound.as_mut() else {
            return Vec::new();
        };
        let mut sent = Vec::new();
        while let Ok(Some(frame)) = outbound.try_next() {
            sent.push(ClientCommand::from_frame(&frame).expect("decode client frame"));
        }
        sent
    }
}
