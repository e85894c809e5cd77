//! Chat widget state: the locally originated log and the send gate.

use crate::auth_session::AuthStatus;
use crate::model::Message;
use crate::transcript::{merge_transcript, TranscriptEntry};
use crate::ws::{MessageSender, SessionSnapshot};

/// What the composer area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    /// Auth state not known yet.
    Loading,
    /// Signed out: sign-in / sign-up links instead of an input.
    SignInPrompt,
    Input,
}

impl ComposerMode {
    pub fn for_auth(auth: AuthStatus) -> Self {
        if auth.is_loading {
            ComposerMode::Loading
        } else if auth.is_authenticated {
            ComposerMode::Input
        } else {
            ComposerMode::SignInPrompt
        }
    }
}

/// Result of [`ChatWidgetState::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Echoed locally and handed to the session.
    Sent,
    /// Nothing but whitespace; nothing happened.
    Empty,
    /// Not signed in; the transport was never touched.
    Blocked,
}

/// Messages that originate in this widget: the welcome line and everything
/// the user typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatWidgetState {
    local: Vec<Message>,
}

impl ChatWidgetState {
    pub fn new(welcome: &str, now_ms: i64) -> Self {
        Self {
            local: vec![Message::system(welcome, now_ms)],
        }
    }

    pub fn local(&self) -> &[Message] {
        &self.local
    }

    /// Echo `text` into the local log and send it.
    pub fn submit<S>(
        &mut self,
        auth: AuthStatus,
        text: &str,
        now_ms: i64,
        sender: &S,
    ) -> SubmitOutcome
    where
        S: MessageSender + ?Sized,
    {
        if ComposerMode::for_auth(auth) != ComposerMode::Input {
            crate::log_warn!("chat send blocked: not signed in");
            return SubmitOutcome::Blocked;
        }

        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }

        self.local.push(Message::user(text, now_ms));
        sender.send_message(text);
        SubmitOutcome::Sent
    }

    /// The transcript to render right now.
    pub fn transcript(
        &self,
        session: &SessionSnapshot,
        now_ms: i64,
        epsilon_ms: i64,
    ) -> Vec<TranscriptEntry> {
        merge_transcript(
            &self.local,
            &session.messages,
            session.is_typing,
            now_ms,
            epsilon_ms,
        )
    }
}
