//! Chat client configuration.
//!
//! Native builds read environment variables:
//! - `COURIER_CHAT_SOCKET_URL`: backend socket URL; `http(s)://` is rewritten
//!   to `ws(s)://` (default: `ws://localhost:3001/ws`)
//! - `COURIER_CHAT_WELCOME`: text of the welcome message
//! - `COURIER_CHAT_TYPING_EPSILON_MS`: how far past "now" the typing indicator
//!   is placed (default: 1)
//! - `COURIER_CHAT_RECONNECT_MAX_ATTEMPTS`: driver reconnect cap, 0 = infinite
//!
//! Browser builds take `COURIER_CHAT_SOCKET_URL` at compile time and
//! otherwise derive the socket from the page origin.

use anyhow::{bail, Context};
use url::Url;

use crate::ws::ReconnectConfig;

pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:3001/ws";
pub const DEFAULT_WELCOME: &str =
    "Hi! I'm the Courier assistant. Ask me to track a parcel, get a quote or book a pickup.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub socket_url: String,
    pub welcome_message: String,
    pub typing_epsilon_ms: i64,
    pub reconnect: ReconnectConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            welcome_message: DEFAULT_WELCOME.to_string(),
            typing_epsilon_ms: 1,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ChatConfig {
    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("COURIER_CHAT_SOCKET_URL") {
            config.socket_url = normalize_socket_url(&raw)?;
        }
        if let Some(welcome) = lookup("COURIER_CHAT_WELCOME") {
            if !welcome.trim().is_empty() {
                config.welcome_message = welcome;
            }
        }
        if let Some(raw) = lookup("COURIER_CHAT_TYPING_EPSILON_MS") {
            config.typing_epsilon_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("COURIER_CHAT_TYPING_EPSILON_MS={raw:?}"))?;
            if config.typing_epsilon_ms < 0 {
                bail!("COURIER_CHAT_TYPING_EPSILON_MS must not be negative");
            }
        }
        if let Some(raw) = lookup("COURIER_CHAT_RECONNECT_MAX_ATTEMPTS") {
            config.reconnect.max_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("COURIER_CHAT_RECONNECT_MAX_ATTEMPTS={raw:?}"))?;
        }

        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_page() -> anyhow::Result<Self> {
        let mut config = Self::from_lookup(|key| match key {
            "COURIER_CHAT_SOCKET_URL" => option_env!("COURIER_CHAT_SOCKET_URL").map(String::from),
            "COURIER_CHAT_WELCOME" => option_env!("COURIER_CHAT_WELCOME").map(String::from),
            _ => None,
        })?;

        if option_env!("COURIER_CHAT_SOCKET_URL").is_none() {
            if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
                let mut url = Url::parse(&origin).context("page origin")?;
                url.set_path("/ws");
                config.socket_url = normalize_socket_url(url.as_str())?;
            }
        }
        Ok(config)
    }

    /// Load the platform config, logging and falling back to defaults on error.
    pub fn load() -> Self {
        #[cfg(target_arch = "wasm32")]
        let loaded = Self::from_page();
        #[cfg(not(target_arch = "wasm32"))]
        let loaded = Self::from_env();

        loaded.unwrap_or_else(|e| {
            crate::log_error!("invalid chat configuration, using defaults: {:#}", e);
            Self::default()
        })
    }
}

/// Turn a backend URL into a WebSocket URL.
pub fn normalize_socket_url(raw: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("invalid socket URL {raw:?}"))?;
    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => bail!("unsupported socket URL scheme {other:?}"),
    };
    if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
        bail!("cannot use {raw:?} as a socket URL");
    }
    Ok(url.to_string())
}
