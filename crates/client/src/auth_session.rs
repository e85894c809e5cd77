//! Authentication session, as far as the chat needs it.
//!
//! The real sign-in flow lives elsewhere; the chat only asks whether someone
//! is signed in and who they are. The one session is persisted in
//! `localStorage` on the web and in a JSON file under the user config
//! directory on desktop. Chat history is never persisted.

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

/// The two flags the chat gates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthStatus {
    fn of(session: Option<&AuthSession>, is_loading: bool) -> Self {
        Self {
            // Nothing counts as signed in until the restore has finished.
            is_authenticated: !is_loading && session.is_some(),
            is_loading,
        }
    }
}

/// Stored session data
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub user_id: String,
    pub display_name: String,
}

/// Authentication context provided to the app
#[derive(Clone, Copy, Debug)]
pub struct AuthContext {
    pub session: Signal<Option<AuthSession>>,
    pub is_loading: Signal<bool>,
}

/// Provider component that sets up auth context
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut session = use_signal(|| None::<AuthSession>);
    let mut is_loading = use_signal(|| true);

    // Restore the persisted session; the composer shows a loading line until then.
    use_future(move || async move {
        let restored = load_session();
        if let Some(restored) = &restored {
            crate::log_debug!("restored chat identity {}", restored.user_id);
        }
        session.set(restored);
        is_loading.set(false);
    });

    use_context_provider(|| AuthContext {
        session,
        is_loading,
    });

    children
}

impl AuthContext {
    pub fn status(&self) -> AuthStatus {
        AuthStatus::of(self.session.read().as_ref(), *self.is_loading.read())
    }

    pub fn user_id(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.user_id.clone())
    }

    pub fn display_name(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.display_name.clone())
    }

    pub fn sign_in(&mut self, user_id: String, display_name: String) {
        crate::log_info!("signed in as {}", user_id);
        let session = AuthSession {
            user_id,
            display_name,
        };
        if !save_session(&session) {
            crate::log_warn!("could not persist auth session");
        }
        self.session.set(Some(session));
    }

    /// Forget the session. Best effort: storage failures are ignored and the
    /// chat connection is left alone.
    pub fn sign_out(&mut self) {
        clear_session();
        self.session.set(None);
    }
}

fn decode_session(json: &str) -> Option<AuthSession> {
    match serde_json::from_str::<AuthSession>(json) {
        Ok(session) if !session.user_id.trim().is_empty() => Some(session),
        Ok(_) => {
            crate::log_warn!("ignoring stored session without a user id");
            None
        }
        Err(e) => {
            crate::log_warn!("ignoring unreadable stored session: {}", e);
            None
        }
    }
}

/// The persisted session, if any.
pub fn load_session() -> Option<AuthSession> {
    decode_session(&persist::read()?)
}

/// Persist `session`, replacing any earlier one. Returns whether it stuck.
pub fn save_session(session: &AuthSession) -> bool {
    match serde_json::to_string(session) {
        Ok(json) => persist::write(&json),
        Err(e) => {
            crate::log_error!("failed to encode auth session: {}", e);
            false
        }
    }
}

pub fn clear_session() {
    persist::clear();
}

#[cfg(target_arch = "wasm32")]
mod persist {
    const KEY: &str = "courier_chat_session";

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    pub fn read() -> Option<String> {
        local_storage()?.get_item(KEY).ok().flatten()
    }

    pub fn write(json: &str) -> bool {
        local_storage().is_some_and(|storage| storage.set_item(KEY, json).is_ok())
    }

    pub fn clear() {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(KEY);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod persist {
    use std::path::{Path, PathBuf};

    fn session_file() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("courier-chat").join("session.json"))
    }

    pub fn read() -> Option<String> {
        read_from(&session_file()?)
    }

    pub fn write(json: &str) -> bool {
        match session_file() {
            Some(path) => match write_to(&path, json) {
                Ok(()) => true,
                Err(e) => {
                    crate::log_warn!("cannot write {}: {}", path.display(), e);
                    false
                }
            },
            None => false,
        }
    }

    pub fn clear() {
        if let Some(path) = session_file() {
            let _ = std::fs::remove_file(path);
        }
    }

    pub(super) fn read_from(path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    pub(super) fn write_to(path: &Path, json: &str) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::ComposerMode;

    fn dana() -> AuthSession {
        AuthSession {
            user_id: "dana@example.com".to_string(),
            display_name: "Dana".to_string(),
        }
    }

    #[test]
    fn restoring_shows_loading_even_with_a_session() {
        let status = AuthStatus::of(Some(&dana()), true);
        assert!(!status.is_authenticated);
        assert_eq!(ComposerMode::for_auth(status), ComposerMode::Loading);
    }

    #[test]
    fn restored_session_unlocks_the_composer() {
        assert_eq!(
            ComposerMode::for_auth(AuthStatus::of(Some(&dana()), false)),
            ComposerMode::Input
        );
        assert_eq!(
            ComposerMode::for_auth(AuthStatus::of(None, false)),
            ComposerMode::SignInPrompt
        );
    }

    #[test]
    fn unreadable_or_anonymous_sessions_are_ignored() {
        assert_eq!(decode_session("not json"), None);
        assert_eq!(
            decode_session(r#"{"user_id":"  ","display_name":"ghost"}"#),
            None
        );
        let json = serde_json::to_string(&dana()).unwrap();
        assert_eq!(decode_session(&json), Some(dana()));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn session_file_round_trips() {
        let path = std::env::temp_dir()
            .join(format!("courier-chat-{}", uuid::Uuid::new_v4()))
            .join("session.json");
        let json = serde_json::to_string(&dana()).unwrap();

        persist::write_to(&path, &json).unwrap();
        let restored = persist::read_from(&path).and_then(|raw| decode_session(&raw));
        assert_eq!(restored, Some(dana()));

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
