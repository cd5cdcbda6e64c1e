// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Normalized conversation records shared by all parsers and renderers.

use crate::platform::Platform;
use serde_json::Value;
use std::fmt;

/// A timestamp exactly as it appeared in the export.
///
/// Interpretation is deferred to the renderer, which knows how each
/// platform encodes time.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    /// A numeric value, usually Unix epoch seconds.
    Seconds(f64),
    /// A textual value such as an ISO-8601 string or a display string.
    Text(String),
}

impl RawTimestamp {
    /// Converts a JSON value, treating `null` and non-scalar values as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Seconds),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "{secs}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The author as named by the export (e.g. `user`, `assistant`, `human`).
    pub author: String,
    /// Ordered text segments; never empty for a retained message.
    pub content: Vec<String>,
    /// When the message was sent, if the export recorded it.
    pub timestamp: Option<RawTimestamp>,
    /// Whether the author is the human side of the conversation.
    pub is_user: bool,
}

/// One chat session, normalized across platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Display title, generated when the export has none.
    pub title: String,
    /// Messages in source order.
    pub messages: Vec<Message>,
    /// 1-based position among the conversations extracted from one payload.
    pub index: usize,
    /// The platform the conversation was exported from.
    pub platform: Platform,
}

impl Conversation {
    /// The placeholder title used when an export provides none.
    #[must_use]
    pub fn default_title(platform: Platform, index: usize) -> String {
        format!("{platform} Conversation {index}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_from_number_and_string() {
        assert_eq!(
            RawTimestamp::from_json(&json!(1_700_000_000)),
            Some(RawTimestamp::Seconds(1_700_000_000.0))
        );
        assert_eq!(
            RawTimestamp::from_json(&json!("2024-01-01T00:00:00Z")),
            Some(RawTimestamp::Text("2024-01-01T00:00:00Z".into()))
        );
    }

    #[test]
    fn timestamp_absent_for_null_and_empty() {
        assert!(RawTimestamp::from_json(&Value::Null).is_none());
        assert!(RawTimestamp::from_json(&json!("")).is_none());
        assert!(RawTimestamp::from_json(&json!({ "t": 1 })).is_none());
    }

    #[test]
    fn timestamp_display_is_raw_text() {
        assert_eq!(RawTimestamp::Seconds(1_700_000_000.0).to_string(), "1700000000");
        assert_eq!(RawTimestamp::Seconds(1.5).to_string(), "1.5");
        assert_eq!(RawTimestamp::Text("Nov 1".into()).to_string(), "Nov 1");
    }

    #[test]
    fn default_title_uses_display_name() {
        assert_eq!(
            Conversation::default_title(Platform::Claude, 3),
            "Claude Conversation 3"
        );
    }
}
