//! Fan-out of inbound transport events to every mounted chat consumer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use courier_chat_shared::ServerEvent;

use super::connection::{lock, TransportEvent, TransportHandle};
use crate::clock::Clock;

/// What subscribers receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Response {
        text: String,
        intent: Option<String>,
        /// Epoch milliseconds.
        timestamp: i64,
    },
    Typing {
        is_typing: bool,
    },
    Error {
        text: String,
    },
    ConnectionChange {
        connected: bool,
    },
}

/// Identifies one subscription on a [`RelayBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Arc<dyn Fn(&RelayEvent) + Send + Sync>;

/// Process-wide publish/subscribe relay between the transport and the chat
/// sessions.
///
/// Each event is delivered once to every subscriber present when it is
/// published, in transport arrival order. There is no replay: a subscriber
/// only sees events published after it subscribed.
pub struct RelayBus {
    attached: AtomicBool,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, Subscriber>>,
    clock: Arc<dyn Clock>,
}

impl RelayBus {
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            attached: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
            clock,
        })
    }

    /// Hook this bus onto `transport`.
    ///
    /// Only the first call registers a transport listener; every later call,
    /// from any number of mounts, returns `false` and changes nothing.
    pub fn attach(self: &Arc<Self>, transport: &TransportHandle) -> bool {
        if self.attached.swap(true, Ordering::SeqCst) {
            return false;
        }

        let relay = Arc::downgrade(self);
        transport.on_inbound(Arc::new(move |event: &TransportEvent| {
            if let Some(relay) = relay.upgrade() {
                relay.relay(event);
            }
        }));
        crate::log_debug!("relay bus attached to {}", transport.url());
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Subscribe until the returned guard is dropped.
    pub fn subscribe(
        self: &Arc<Self>,
        subscriber: impl Fn(&RelayEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.subscribers).insert(id, Arc::new(subscriber));
        Subscription {
            id,
            relay: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: SubscriberId) {
        lock(&self.subscribers).remove(&id);
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Deliver `event` to the current subscribers. Returns how many got it.
    pub fn publish(&self, event: RelayEvent) -> usize {
        let subscribers: Vec<Subscriber> = lock(&self.subscribers).values().cloned().collect();
        for subscriber in &subscribers {
            subscriber(&event);
        }
        subscribers.len()
    }

    fn relay(&self, event: &TransportEvent) {
        self.publish(self.translate(event));
    }

    fn translate(&self, event: &TransportEvent) -> RelayEvent {
        match event {
            TransportEvent::ConnectionChanged(connected) => RelayEvent::ConnectionChange {
                connected: *connected,
            },
            TransportEvent::Server(ServerEvent::Response(payload)) => {
                let timestamp = payload.timestamp_millis().unwrap_or_else(|e| {
                    crate::log_warn!("{}; stamping reply with the local clock", e);
                    self.clock.now_ms()
                });
                RelayEvent::Response {
                    text: payload.message.clone(),
                    intent: payload.intent.clone(),
                    timestamp,
                }
            }
            TransportEvent::Server(ServerEvent::Typing(payload)) => RelayEvent::Typing {
                is_typing: payload.is_typing,
            },
            TransportEvent::Server(ServerEvent::Error(payload)) => RelayEvent::Error {
                text: payload.message.clone(),
            },
        }
    }
}

/// Live subscription on a [`RelayBus`]; unsubscribes on drop.
pub struct Subscription {
    id: SubscriberId,
    relay: Weak<RelayBus>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.upgrade() {
            relay.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_chat_shared::{ChatErrorPayload, ChatResponsePayload, TypingPayload};

    use super::*;
    use crate::clock::ManualClock;
    use crate::ws::connection::memory::MemoryConnector;

    fn setup() -> (Arc<RelayBus>, TransportHandle, MemoryConnector) {
        let connector = MemoryConnector::default();
        let transport = TransportHandle::new("ws://chat.test/ws", Arc::new(connector.clone()));
        let relay = RelayBus::new(Arc::new(ManualClock::at(7_000)));
        transport.ensure_connected();
        connector.open();
        (relay, transport, connector)
    }

    fn collect(relay: &Arc<RelayBus>) -> (Subscription, Arc<Mutex<Vec<RelayEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = relay.subscribe(move |event| lock(&sink).push(event.clone()));
        (sub, seen)
    }

    fn response(text: &str, timestamp: &str) -> ServerEvent {
        ServerEvent::Response(ChatResponsePayload {
            message: text.to_string(),
            intent: None,
            timestamp: Some(timestamp.to_string()),
        })
    }

    #[test]
    fn attach_registers_a_single_transport_listener() {
        let (relay, transport, _connector) = setup();
        assert!(relay.attach(&transport));
        for _ in 0..5 {
            assert!(!relay.attach(&transport));
        }
        assert_eq!(transport.listener_count(), 1);
        assert!(relay.is_attached());
    }

    #[test]
    fn translates_every_server_event_kind_in_order() {
        let (relay, transport, connector) = setup();
        relay.attach(&transport);
        let (_sub, seen) = collect(&relay);

        connector.push(&ServerEvent::Typing(TypingPayload { is_typing: true }));
        connector.push(&response("On its way", "1970-01-01T00:00:01.500Z"));
        connector.push(&ServerEvent::Error(ChatErrorPayload {
            message: "intent service unavailable".to_string(),
        }));
        connector.drop_connection();

        assert_eq!(
            *lock(&seen),
            vec![
                RelayEvent::Typing { is_typing: true },
                RelayEvent::Response {
                    text: "On its way".to_string(),
                    intent: None,
                    timestamp: 1_500,
                },
                RelayEvent::Error {
                    text: "intent service unavailable".to_string(),
                },
                RelayEvent::ConnectionChange { connected: false },
            ]
        );
    }

    #[test]
    fn bad_timestamp_falls_back_to_local_clock() {
        let (relay, transport, connector) = setup();
        relay.attach(&transport);
        let (_sub, seen) = collect(&relay);

        connector.push(&response("late", "not a date"));

        assert!(matches!(
            lock(&seen).as_slice(),
            [RelayEvent::Response { timestamp: 7_000, .. }]
        ));
    }

    #[test]
    fn missing_timestamp_falls_back_to_local_clock() {
        let (relay, transport, connector) = setup();
        relay.attach(&transport);
        let (_sub, seen) = collect(&relay);

        connector.push_raw(r#"{"event":"chat:response","data":{"message":"no clock here"}}"#);
        connector.push(&response("offset-less", "1970-01-01T00:00:02"));

        assert_eq!(
            *lock(&seen),
            vec![
                RelayEvent::Response {
                    text: "no clock here".to_string(),
                    intent: None,
                    timestamp: 7_000,
                },
                RelayEvent::Response {
                    text: "offset-less".to_string(),
                    intent: None,
                    timestamp: 2_000,
                },
            ]
        );
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let relay = RelayBus::new(Arc::new(ManualClock::default()));
        let (first, first_seen) = collect(&relay);
        let (_second, second_seen) = collect(&relay);
        assert_eq!(relay.subscriber_count(), 2);

        drop(first);
        assert_eq!(relay.subscriber_count(), 1);
        assert_eq!(relay.publish(RelayEvent::Typing { is_typing: true }), 1);

        assert!(lock(&first_seen).is_empty());
        assert_eq!(lock(&second_seen).len(), 1);
    }

    #[test]
    fn late_subscriber_gets_no_replay() {
        let relay = RelayBus::new(Arc::new(ManualClock::default()));
        relay.publish(RelayEvent::Error {
            text: "before anyone listened".to_string(),
        });

        let (_sub, seen) = collect(&relay);
        relay.publish(RelayEvent::Typing { is_typing: false });

        assert_eq!(*lock(&seen), vec![RelayEvent::Typing { is_typing: false }]);
    }

    #[test]
    fn subscriber_may_unsubscribe_others_while_receiving() {
        let relay = RelayBus::new(Arc::new(ManualClock::default()));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot = victim.clone();
        let _killer = relay.subscribe(move |_| {
            lock(&slot).take();
        });
        *lock(&victim) = Some(relay.subscribe(|_| {}));

        relay.publish(RelayEvent::Typing { is_typing: true });
        assert_eq!(relay.subscriber_count(), 1);
    }
}
