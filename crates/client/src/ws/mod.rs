//! Real-time chat synchronization.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  TransportHandle                     │
//! │   (one per process; socket driven by a Connector)    │
//! └──────────────────────────────────────────────────────┘
//!                          │ TransportEvent
//!                          ▼
//!              ┌───────────────────────┐
//!              │       RelayBus        │
//!              │ (attached once, fans  │
//!              │  out in arrival order)│
//!              └───────────────────────┘
//!                          │ RelayEvent
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │ ChatSession │ │ ChatSession │ │ ChatSession │
//!   │ (widget A)  │ │ (widget B)  │ │    ...      │
//!   └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! Outbound messages go the other way: `ChatSession::send_message` emits
//! straight on the transport.
//!
//! # Usage
//!
//! ```rust,ignore
//! // In your app root
//! rsx! {
//!     ChatProvider {
//!         // Your app here
//!     }
//! }
//!
//! // In a component
//! let chat = use_chat_session(Some(user_id));
//! let snapshot = chat.snapshot();
//! ```

mod connection;
mod hooks;
mod relay;
mod runtime;
mod session;

pub(crate) use connection::lock;
pub use connection::{
    ConnectionState, Connector, InboundListener, ReconnectConfig, TransportError, TransportEvent,
    TransportHandle, TransportLink, WebSocketConnector,
};
pub use hooks::{use_chat_runtime, use_chat_session, ChatProvider, UseChatSession};
pub use relay::{RelayBus, RelayEvent, SubscriberId, Subscription};
pub use runtime::ChatRuntime;
pub use session::{ChatSession, MessageSender, SessionSnapshot};

#[cfg(test)]
pub(crate) use connection::memory::MemoryConnector;
