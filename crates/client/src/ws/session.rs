//! One consumer's view of the chat: remote messages, typing and connection
//! flags, and the send path.

use std::sync::{Arc, Mutex};

use courier_chat_shared::ClientCommand;

use super::connection::{lock, TransportHandle};
use super::relay::{RelayEvent, Subscription};
use super::runtime::ChatRuntime;
use crate::intents::actions_for_intent;
use crate::model::Message;

/// State a session has accumulated from the relay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Remote messages in arrival order. Append-only.
    pub messages: Vec<Message>,
    pub is_typing: bool,
    pub connected: bool,
}

impl SessionSnapshot {
    /// Fold one relay event into the snapshot. `now_ms` stamps backend
    /// errors, which carry no timestamp of their own.
    pub fn apply(&mut self, event: &RelayEvent, now_ms: i64) {
        match event {
            RelayEvent::Response {
                text,
                intent,
                timestamp,
            } => {
                let message = Message::remote(text.clone(), *timestamp)
                    .with_actions(actions_for_intent(intent.as_deref()));
                self.messages.push(message);
                self.is_typing = false;
            }
            RelayEvent::Error { text } => {
                // Backend errors are ordinary bubbles; there is no other error surface.
                self.messages.push(Message::remote(text.clone(), now_ms));
                self.is_typing = false;
            }
            RelayEvent::Typing { is_typing } => self.is_typing = *is_typing,
            RelayEvent::ConnectionChange { connected } => self.connected = *connected,
        }
    }
}

/// Anything that can take a chat message from the composer.
pub trait MessageSender {
    /// Send `text`. Returns `false` when there was nothing to send.
    fn send_message(&self, text: &str) -> bool;
}

/// A mounted consumer's private view of the chat.
///
/// Dropping the session detaches it from the relay; the shared transport is
/// left untouched.
pub struct ChatSession {
    state: Arc<Mutex<SessionSnapshot>>,
    user_id: Mutex<String>,
    transport: Arc<TransportHandle>,
    subscription: Subscription,
}

impl ChatSession {
    /// Connect (if nobody has yet), hook the relay up (if nobody has yet) and
    /// subscribe. `notify` runs after every state change.
    pub fn attach(
        runtime: &ChatRuntime,
        user_id: impl Into<String>,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let transport = runtime.transport().clone();
        transport.ensure_connected();
        runtime.relay().attach(&transport);

        let state = Arc::new(Mutex::new(SessionSnapshot::default()));

        let clock = runtime.clock().clone();
        let sink = state.clone();
        let subscription = runtime.relay().subscribe(move |event| {
            lock(&sink).apply(event, clock.now_ms());
            notify();
        });
        // Seeded after subscribing so a flip in between is not lost.
        lock(&state).connected = transport.is_connected();
        crate::log_debug!("chat session {:?} attached", subscription.id());

        Self {
            state,
            user_id: Mutex::new(user_id.into()),
            transport,
            subscription,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.state).clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).messages.clone()
    }

    pub fn is_typing(&self) -> bool {
        lock(&self.state).is_typing
    }

    pub fn connected(&self) -> bool {
        lock(&self.state).connected
    }

    pub fn user_id(&self) -> String {
        lock(&self.user_id).clone()
    }

    pub fn set_user_id(&self, user_id: &str) {
        let mut current = lock(&self.user_id);
        if *current != user_id {
            *current = user_id.to_string();
        }
    }
}

impl MessageSender for ChatSession {
    /// Forward trimmed, non-empty text to the backend. No local echo is added
    /// here and failed sends are not retried.
    fn send_message(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let command = ClientCommand::message(text, self.user_id());
        if let Err(e) = self.transport.emit(&command) {
            crate::log_warn!("chat message not sent: {}", e);
        }
        true
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        crate::log_debug!("chat session {:?} detached", self.subscription.id());
    }
}
