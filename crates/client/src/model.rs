//! Chat transcript model.

use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    /// Typed by the signed-in user.
    User,
    /// Sent by the chat backend, including backend errors.
    Remote,
    /// Generated locally, e.g. the welcome message.
    System,
}

/// A button attached to a bot message that navigates inside the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAction {
    pub label: String,
    pub path: String,
}

impl MessageAction {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// A single transcript message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    origin: MessageOrigin,
    text: String,
    /// Epoch milliseconds.
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    actions: Vec<MessageAction>,
}

impl Message {
    pub fn new(origin: MessageOrigin, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            origin,
            text: text.into(),
            timestamp,
            actions: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(MessageOrigin::User, text, timestamp)
    }

    pub fn remote(text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(MessageOrigin::Remote, text, timestamp)
    }

    pub fn system(text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(MessageOrigin::System, text, timestamp)
    }

    /// Attach action buttons. Only used while building a message.
    pub fn with_actions(mut self, actions: Vec<MessageAction>) -> Self {
        self.actions = actions;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> MessageOrigin {
        self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn actions(&self) -> &[MessageAction] {
        &self.actions
    }
}
