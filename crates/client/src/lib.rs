//! Courier Chat client - Dioxus web application
//!
//! The support chat widget of a courier site: a single shared WebSocket,
//! a relay that fans backend events out to mounted widgets, and the widget
//! that merges the local and remote logs into one transcript.

// Macros must be declared before the modules that use them.
#[macro_use]
pub mod logging;

pub mod auth_session;
pub mod clock;
pub mod config;
pub mod intents;
pub mod model;
pub mod transcript;
pub mod widget;
pub mod ws;

pub mod components;
pub mod routes;
pub mod views;

pub use auth_session::{AuthContext, AuthProvider, AuthSession, AuthStatus};
pub use config::ChatConfig;
pub use routes::Route;
pub use ws::{ChatProvider, ChatRuntime, ChatSession};
