//! Chat backend wire protocol.
//!
//! Every WebSocket text frame carries one JSON object of the form
//! `{"event": "<name>", "data": <payload>}`. Payload field names are camelCase
//! on the wire.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Client to server: a user-authored chat message.
pub const EVENT_CHAT_MESSAGE: &str = "chat:message";
/// Server to client: a bot reply.
pub const EVENT_CHAT_RESPONSE: &str = "chat:response";
/// Server to client: the bot started or stopped typing.
pub const EVENT_CHAT_TYPING: &str = "chat:typing";
/// Server to client: the backend failed to handle a message.
pub const EVENT_CHAT_ERROR: &str = "chat:error";

/// Payload of `chat:message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub message: String,
    pub user_id: String,
}

/// Payload of `chat:response`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponsePayload {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// ISO-8601 timestamp assigned by the backend. Some backends omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatResponsePayload {
    /// Parse the ISO-8601 timestamp into epoch milliseconds.
    ///
    /// Accepts RFC 3339, basic `+hhmm` offsets, and offset-less times, which
    /// are read as UTC.
    pub fn timestamp_millis(&self) -> Result<i64, ProtocolError> {
        let raw = self
            .timestamp
            .as_deref()
            .ok_or(ProtocolError::MissingTimestamp)?;
        parse_iso8601_millis(raw).ok_or_else(|| ProtocolError::InvalidTimestamp(raw.to_string()))
    }
}

fn parse_iso8601_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Payload of `chat:typing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub is_typing: bool,
}

/// Payload of `chat:error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatErrorPayload {
    pub message: String,
}

/// Commands the client sends to the chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientCommand {
    #[serde(rename = "chat:message")]
    Message(ChatMessagePayload),
}

impl ClientCommand {
    /// Build a `chat:message` command.
    pub fn message(text: impl Into<String>, user_id: impl Into<String>) -> Self {
        ClientCommand::Message(ChatMessagePayload {
            message: text.into(),
            user_id: user_id.into(),
        })
    }

    /// Wire name of this command.
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientCommand::Message(_) => EVENT_CHAT_MESSAGE,
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

/// Events the chat backend pushes to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "chat:response")]
    Response(ChatResponsePayload),
    #[serde(rename = "chat:typing")]
    Typing(TypingPayload),
    #[serde(rename = "chat:error")]
    Error(ChatErrorPayload),
}

impl ServerEvent {
    /// Wire name of this event.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::Response(_) => EVENT_CHAT_RESPONSE,
            ServerEvent::Typing(_) => EVENT_CHAT_TYPING,
            ServerEvent::Error(_) => EVENT_CHAT_ERROR,
        }
    }

    /// Decode a text frame received from the backend.
    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }

    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_message_uses_camel_case_user_id() {
        let frame = ClientCommand::message("where is my parcel?", "u-42")
            .to_frame()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "chat:message",
                "data": { "message": "where is my parcel?", "userId": "u-42" }
            })
        );
    }

    #[test]
    fn decodes_response_with_and_without_intent() {
        let with_intent = r#"{"event":"chat:response","data":{"message":"Sure","intent":"track_shipment","timestamp":"2024-05-01T10:00:00.000Z"}}"#;
        let ServerEvent::Response(payload) = ServerEvent::from_frame(with_intent).unwrap() else {
            panic!("expected a response");
        };
        assert_eq!(payload.intent.as_deref(), Some("track_shipment"));
        assert_eq!(payload.timestamp_millis().unwrap(), 1_714_557_600_000);

        let without_intent = r#"{"event":"chat:response","data":{"message":"Hi","timestamp":"2024-05-01T10:00:00Z"}}"#;
        let ServerEvent::Response(payload) = ServerEvent::from_frame(without_intent).unwrap() else {
            panic!("expected a response");
        };
        assert!(payload.intent.is_none());
    }

    #[test]
    fn decodes_typing_and_error() {
        let typing = ServerEvent::from_frame(r#"{"event":"chat:typing","data":{"isTyping":true}}"#)
            .unwrap();
        assert_eq!(typing, ServerEvent::Typing(TypingPayload { is_typing: true }));
        assert_eq!(typing.event_name(), EVENT_CHAT_TYPING);

        let error = ServerEvent::from_frame(r#"{"event":"chat:error","data":{"message":"boom"}}"#)
            .unwrap();
        assert_eq!(
            error,
            ServerEvent::Error(ChatErrorPayload {
                message: "boom".to_string()
            })
        );
    }

    #[test]
    fn unknown_event_is_a_decode_error() {
        let err = ServerEvent::from_frame(r#"{"event":"chat:presence","data":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn invalid_timestamp_is_reported() {
        let payload = ChatResponsePayload {
            message: "late".to_string(),
            intent: None,
            timestamp: Some("yesterday-ish".to_string()),
        };
        assert!(matches!(
            payload.timestamp_millis(),
            Err(ProtocolError::InvalidTimestamp(ts)) if ts == "yesterday-ish"
        ));
    }

    #[test]
    fn response_without_timestamp_still_decodes() {
        let frame = r#"{"event":"chat:response","data":{"message":"hi"}}"#;
        let ServerEvent::Response(payload) = ServerEvent::from_frame(frame).unwrap() else {
            panic!("expected a response");
        };
        assert_eq!(payload.message, "hi");
        assert!(payload.timestamp.is_none());
        assert!(matches!(
            payload.timestamp_millis(),
            Err(ProtocolError::MissingTimestamp)
        ));

        let null_frame = r#"{"event":"chat:response","data":{"message":"hi","timestamp":null}}"#;
        assert!(ServerEvent::from_frame(null_frame).is_ok());
    }

    #[test]
    fn accepts_iso8601_without_colon_or_offset() {
        let at = |ts: &str| ChatResponsePayload {
            message: "ok".to_string(),
            intent: None,
            timestamp: Some(ts.to_string()),
        };
        assert_eq!(at("2024-05-01T10:00:00").timestamp_millis().unwrap(), 1_714_557_600_000);
        assert_eq!(
            at("2024-05-01T10:00:00.000+0000").timestamp_millis().unwrap(),
            1_714_557_600_000
        );
        assert_eq!(
            at("2024-05-01T12:00:00.250+0200").timestamp_millis().unwrap(),
            1_714_557_600_250
        );
    }
}
