// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Rendering of normalized conversations into documents.
//!
//! Renderers are pure functions of the conversation and the
//! [`RenderOptions`]; the export time is passed in rather than read from the
//! clock, so rendering the same input twice gives identical output.
//!
//! # Example
//!
//! ```
//! use aiexport::model::{Conversation, Message, RawTimestamp};
//! use aiexport::platform::Platform;
//! use aiexport::renderer::{render, OutputFormat, RenderOptions};
//! use chrono::{TimeZone, Utc};
//!
//! let conversation = Conversation {
//!     title: "Greeting".into(),
//!     messages: vec![Message {
//!         author: "user".into(),
//!         content: vec!["Hello!".into()],
//!         timestamp: Some(RawTimestamp::Seconds(1_700_000_000.0)),
//!         is_user: true,
//!     }],
//!     index: 1,
//!     platform: Platform::ChatGpt,
//! };
//! let opts = RenderOptions {
//!     user_name: "Me".into(),
//!     assistant_name: "ChatGPT".into(),
//!     exported_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 0).unwrap(),
//! };
//!
//! let markdown = render(&conversation, OutputFormat::Markdown, &opts);
//! assert!(markdown.contains("# Greeting"));
//! assert!(markdown.contains("### Me — 2023-11-14 22:13"));
//! ```

pub mod html;
pub mod markdown;
pub mod text;

use crate::model::{Conversation, Message, RawTimestamp};
use crate::platform::Platform;
use chrono::{DateTime, NaiveDateTime, Utc};
use snafu::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Text shown when a message has no timestamp.
pub const UNKNOWN_TIME: &str = "Unknown";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const FALLBACK_CHARS: usize = 16;

/// A document format a conversation can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Markdown with YAML front matter.
    Markdown,
    /// A standalone HTML page with inline styles.
    Html,
    /// Plain text.
    Text,
}

impl OutputFormat {
    /// File extension for documents in this format, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Error returned when an output format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("unknown output format {name:?} (expected md, html or txt)"))]
pub struct UnknownFormat {
    /// The name that failed to parse.
    name: String,
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            "txt" | "text" => Ok(Self::Text),
            _ => UnknownFormatSnafu { name: s }.fail(),
        }
    }
}

/// Display settings shared by all renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name shown for the user's messages.
    pub user_name: String,
    /// Name shown for the AI's messages.
    pub assistant_name: String,
    /// Time the export was generated, shown in document headers.
    pub exported_at: DateTime<Utc>,
}

impl RenderOptions {
    /// Options with the default user name and the platform's product name.
    #[must_use]
    pub fn for_platform(platform: Platform, exported_at: DateTime<Utc>) -> Self {
        Self {
            user_name: "User".into(),
            assistant_name: platform.display_name().into(),
            exported_at,
        }
    }

    /// The display name for the author of `message`.
    #[must_use]
    pub fn name_for(&self, message: &Message) -> &str {
        if message.is_user {
            &self.user_name
        } else {
            &self.assistant_name
        }
    }

    fn exported(&self) -> String {
        self.exported_at.format(TIME_FORMAT).to_string()
    }
}

/// Renders `conversation` in `format`.
#[must_use]
pub fn render(conversation: &Conversation, format: OutputFormat, opts: &RenderOptions) -> String {
    match format {
        OutputFormat::Markdown => markdown::render(conversation, opts),
        OutputFormat::Html => html::render(conversation, opts),
        OutputFormat::Text => text::render(conversation, opts),
    }
}

/// Formats a message timestamp the way `platform` encodes it.
///
/// Claude timestamps are ISO-8601 strings and ChatGPT's are Unix seconds;
/// both are shown as `YYYY-MM-DD HH:MM` in UTC. Gemini timestamps are
/// already human-readable and pass through. Values that do not parse are
/// cut to their first 16 characters.
#[must_use]
pub fn format_timestamp(platform: Platform, timestamp: Option<&RawTimestamp>) -> String {
    let Some(timestamp) = timestamp else {
        return UNKNOWN_TIME.to_owned();
    };
    let parsed = match platform {
        Platform::Gemini => return timestamp.to_string(),
        Platform::Claude => parse_iso8601(timestamp),
        Platform::ChatGpt => parse_unix(timestamp),
    };
    parsed.map_or_else(
        || timestamp.to_string().chars().take(FALLBACK_CHARS).collect(),
        |dt| dt.format(TIME_FORMAT).to_string(),
    )
}

#[allow(clippy::cast_possible_truncation)]
fn parse_unix(timestamp: &RawTimestamp) -> Option<NaiveDateTime> {
    let secs = match timestamp {
        RawTimestamp::Seconds(secs) => *secs,
        RawTimestamp::Text(text) => text.trim().parse().ok()?,
    };
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.floor() as i64, 0).map(|dt| dt.naive_utc())
}

/// Parses an ISO-8601 string after dropping fractional seconds and zone.
fn parse_iso8601(timestamp: &RawTimestamp) -> Option<NaiveDateTime> {
    let RawTimestamp::Text(text) = timestamp else {
        return None;
    };
    let head = text.trim().split(['.', 'Z', '+']).next()?;
    let head = head.get(..19).unwrap_or(head);
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// The content segments of `message` ready for display: trimmed, blank ones
/// dropped. Gemini text is also re-split on blank lines so paragraph spacing
/// is uniform.
pub(crate) fn display_segments(message: &Message, platform: Platform) -> Vec<String> {
    message
        .content
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if platform == Platform::Gemini {
                segment
                    .split("\n\n")
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            } else {
                segment.to_owned()
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub fn opts() -> RenderOptions {
        RenderOptions {
            user_name: "Alice".into(),
            assistant_name: "Bot".into(),
            exported_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    pub fn message(is_user: bool, content: &[&str], timestamp: Option<RawTimestamp>) -> Message {
        Message {
            author: if is_user { "user" } else { "assistant" }.into(),
            content: content.iter().map(|&s| s.to_owned()).collect(),
            timestamp,
            is_user,
        }
    }

    pub fn conversation(platform: Platform, messages: Vec<Message>) -> Conversation {
        Conversation {
            title: "Test Chat".into(),
            messages,
            index: 1,
            platform,
        }
    }

    fn text(s: &str) -> RawTimestamp {
        RawTimestamp::Text(s.into())
    }

    #[test]
    fn formats_unix_seconds() {
        let ts = RawTimestamp::Seconds(1_700_000_000.9);
        assert_eq!(format_timestamp(Platform::ChatGpt, Some(&ts)), "2023-11-14 22:13");
        assert_eq!(
            format_timestamp(Platform::ChatGpt, Some(&text("1700000000"))),
            "2023-11-14 22:13"
        );
    }

    #[test]
    fn formats_iso8601() {
        for raw in [
            "2024-05-01T10:20:30Z",
            "2024-05-01T10:20:30.123456Z",
            "2024-05-01T10:20:30+00:00",
            "2024-05-01T10:20:30-05:00",
            "2024-05-01 10:20:30",
        ] {
            assert_eq!(
                format_timestamp(Platform::Claude, Some(&text(raw))),
                "2024-05-01 10:20",
                "{raw}"
            );
        }
    }

    #[test]
    fn gemini_passes_through() {
        let ts = text("Nov 11, 2025, 9:04:17 PM PST");
        assert_eq!(
            format_timestamp(Platform::Gemini, Some(&ts)),
            "Nov 11, 2025, 9:04:17 PM PST"
        );
    }

    #[test]
    fn missing_timestamp_is_unknown() {
        for platform in Platform::ALL {
            assert_eq!(format_timestamp(platform, None), "Unknown");
        }
    }

    #[test]
    fn unparseable_values_are_truncated() {
        assert_eq!(
            format_timestamp(Platform::ChatGpt, Some(&text("yesterday afternoon at five"))),
            "yesterday aftern"
        );
        assert_eq!(
            format_timestamp(Platform::Claude, Some(&RawTimestamp::Seconds(1_700_000_000.0))),
            "1700000000"
        );
        assert_eq!(
            format_timestamp(Platform::ChatGpt, Some(&RawTimestamp::Seconds(f64::NAN))),
            "NaN"
        );
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn display_segments_trim_and_skip_blank() {
        let msg = message(false, &["  a  ", "   ", "b\n\n\n\nc"], None);
        assert_eq!(display_segments(&msg, Platform::ChatGpt), vec!["a", "b\n\n\n\nc"]);
        assert_eq!(display_segments(&msg, Platform::Gemini), vec!["a", "b\n\nc"]);
    }

    #[test]
    fn names_follow_is_user() {
        let opts = opts();
        assert_eq!(opts.name_for(&message(true, &["x"], None)), "Alice");
        assert_eq!(opts.name_for(&message(false, &["x"], None)), "Bot");
    }

    #[test]
    fn rendering_is_deterministic() {
        let conv = conversation(
            Platform::ChatGpt,
            vec![
                message(true, &["Hi"], Some(RawTimestamp::Seconds(1_700_000_000.0))),
                message(false, &["Hello"], None),
            ],
        );
        for format in [OutputFormat::Markdown, OutputFormat::Html, OutputFormat::Text] {
            assert_eq!(render(&conv, format, &opts()), render(&conv, format, &opts()));
        }
    }
}
