//! Dioxus glue for the chat runtime.
//!
//! Sessions are plain Rust objects; these hooks own one per mounted
//! component and turn its change notifications into re-renders.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use futures_util::StreamExt;

use super::runtime::ChatRuntime;
use super::session::{ChatSession, MessageSender, SessionSnapshot};

/// Identity used before anyone signs in. Sends are gated in the widget, so
/// it never reaches the backend.
const ANONYMOUS_USER: &str = "anonymous";

/// Puts the process [`ChatRuntime`] into context for everything below.
#[component]
pub fn ChatProvider(children: Element) -> Element {
    use_context_provider(|| ChatRuntime::global().clone());
    children
}

/// The runtime provided by [`ChatProvider`].
pub fn use_chat_runtime() -> ChatRuntime {
    use_context::<ChatRuntime>()
}

/// A component's chat session plus the signal that ticks on every change.
#[derive(Clone)]
pub struct UseChatSession {
    session: Rc<ChatSession>,
    revision: Signal<u64>,
}

impl UseChatSession {
    /// Current state. Reading it subscribes the caller to future changes.
    pub fn snapshot(&self) -> SessionSnapshot {
        let _ = self.revision.read();
        self.session.snapshot()
    }

    pub fn revision(&self) -> Signal<u64> {
        self.revision
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn send_message(&self, text: &str) -> bool {
        self.session.send_message(text)
    }
}

impl PartialEq for UseChatSession {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.session, &other.session)
    }
}

/// Attach a [`ChatSession`] for the lifetime of the calling component.
///
/// The session detaches from the relay when the component unmounts; the
/// shared connection stays up.
pub fn use_chat_session(user_id: Option<String>) -> UseChatSession {
    let runtime = use_chat_runtime();
    let mut revision = use_signal(|| 0u64);

    let (session, notifications) = use_hook(|| {
        let (tx, rx) = futures_channel::mpsc::unbounded::<()>();
        let session = ChatSession::attach(
            &runtime,
            user_id.clone().unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            move || {
                let _ = tx.unbounded_send(());
            },
        );
        (Rc::new(session), Rc::new(RefCell::new(Some(rx))))
    });

    use_future(move || {
        let notifications = notifications.clone();
        async move {
            let Some(mut rx) = notifications.borrow_mut().take() else {
                return;
            };
            while rx.next().await.is_some() {
                revision += 1;
            }
        }
    });

    session.set_user_id(user_id.as_deref().unwrap_or(ANONYMOUS_USER));

    UseChatSession { session, revision }
}
