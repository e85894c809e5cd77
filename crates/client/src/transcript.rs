//! Merging the local and remote logs into the rendered transcript.

use crate::model::Message;

/// One rendered row of the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message(Message),
    /// Synthetic "bot is typing" row. Never stored.
    TypingIndicator { timestamp: i64 },
}

/// Render key of the typing row.
pub const TYPING_INDICATOR_KEY: &str = "typing-indicator";

impl TranscriptEntry {
    pub fn timestamp(&self) -> i64 {
        match self {
            TranscriptEntry::Message(message) => message.timestamp(),
            TranscriptEntry::TypingIndicator { timestamp } => *timestamp,
        }
    }

    /// Stable key for list rendering.
    pub fn key(&self) -> &str {
        match self {
            TranscriptEntry::Message(message) => message.id(),
            TranscriptEntry::TypingIndicator { .. } => TYPING_INDICATOR_KEY,
        }
    }

    pub fn is_typing_indicator(&self) -> bool {
        matches!(self, TranscriptEntry::TypingIndicator { .. })
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            TranscriptEntry::Message(message) => Some(message),
            TranscriptEntry::TypingIndicator { .. } => None,
        }
    }
}

/// Merge both logs into one list sorted by timestamp, ascending.
///
/// The sort is stable, so on equal timestamps local messages come before
/// remote ones and each log keeps its own order. While `is_typing`, one
/// indicator row is placed at `now_ms + epsilon_ms`.
///
/// A remote message stamped later than `now_ms + epsilon_ms` (clock skew, or
/// a backend that stamps the future) sorts after the indicator.
pub fn merge_transcript(
    local: &[Message],
    remote: &[Message],
    is_typing: bool,
    now_ms: i64,
    epsilon_ms: i64,
) -> Vec<TranscriptEntry> {
    let mut entries: Vec<TranscriptEntry> = Vec::with_capacity(local.len() + remote.len() + 1);
    entries.extend(local.iter().cloned().map(TranscriptEntry::Message));
    entries.extend(remote.iter().cloned().map(TranscriptEntry::Message));
    if is_typing {
        entries.push(TranscriptEntry::TypingIndicator {
            timestamp: now_ms.saturating_add(epsilon_ms),
        });
    }
    entries.sort_by_key(TranscriptEntry::timestamp);
    entries
}
