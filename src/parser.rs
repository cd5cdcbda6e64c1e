// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Parsing of platform exports into normalized [`Conversation`]s.
//!
//! Each platform has one parse function taking the raw payload and its
//! [`ParserConfig`]. Parsing is best effort: a malformed conversation, block
//! or message is dropped and the reason is reported to the [`Observer`],
//! while everything that could be understood is returned.
//!
//! # Example
//!
//! ```
//! use aiexport::config::ParserConfig;
//! use aiexport::parser::{parse, RawPayload};
//! use aiexport::platform::Platform;
//! use aiexport::report::Event;
//! use serde_json::json;
//!
//! let payload = RawPayload::Json(json!({
//!     "title": "Greeting",
//!     "mapping": {
//!         "m1": { "message": {
//!             "author": { "role": "user" },
//!             "content": { "parts": ["Hi"] },
//!             "create_time": 1700000000
//!         }}
//!     }
//! }));
//!
//! let mut events: Vec<Event> = Vec::new();
//! let config = ParserConfig::builtin(Platform::ChatGpt);
//! let conversations = parse(Platform::ChatGpt, &payload, &config, &mut events);
//!
//! assert_eq!(conversations.len(), 1);
//! assert_eq!(conversations[0].title, "Greeting");
//! assert!(conversations[0].messages[0].is_user);
//! ```

pub mod chatgpt;
pub mod claude;
pub mod gemini;
pub mod html;

use crate::config::ParserConfig;
use crate::model::Conversation;
use crate::platform::Platform;
use crate::report::{Event, Observer};
use serde_json::Value;
use snafu::prelude::*;

/// An export loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// An HTML document.
    Html(String),
    /// A parsed JSON document.
    Json(Value),
}

impl RawPayload {
    /// A short name for the payload's kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Html(_) => "HTML",
            Self::Json(_) => "JSON",
        }
    }
}

/// Why a conversation or block was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SkipReason {
    /// The conversation entry is not a JSON object.
    #[snafu(display("conversation is not an object"))]
    NotAnObject,

    /// No message had both an author and non-empty content.
    #[snafu(display("no messages with author and content"))]
    NoMessages,

    /// The Gemini block has no content cell.
    #[snafu(display("block has no content cell"))]
    MissingContentCell,

    /// The Gemini block has no `Prompted`/`Created` line.
    #[snafu(display("block has no prompt marker"))]
    NoPrompt,

    /// The parser was given a payload of the wrong kind.
    #[snafu(display("{platform} parser cannot read a {found} payload"))]
    WrongPayload {
        /// The parser's platform.
        platform: Platform,
        /// The kind of payload that was supplied.
        found: &'static str,
    },
}

/// Signature shared by every platform parser.
pub type ParseFn = fn(&RawPayload, &ParserConfig, &mut dyn Observer) -> Vec<Conversation>;

/// Looks up the parse function for `platform`.
#[must_use]
pub fn parser_for(platform: Platform) -> ParseFn {
    match platform {
        Platform::ChatGpt => chatgpt::parse,
        Platform::Claude => claude::parse,
        Platform::Gemini => gemini::parse,
    }
}

/// Parses `payload` as an export from `platform`.
pub fn parse(
    platform: Platform,
    payload: &RawPayload,
    config: &ParserConfig,
    observer: &mut dyn Observer,
) -> Vec<Conversation> {
    parser_for(platform)(payload, config, observer)
}

/// Keeps the successful attempts, numbering them from 1 in source order,
/// and reports every failure with its 1-based source position.
///
/// Each attempt receives the index it will get if it succeeds.
pub(crate) fn collect<I, F>(items: I, observer: &mut dyn Observer, mut attempt: F) -> Vec<Conversation>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Result<Conversation, SkipReason>,
{
    let mut conversations = Vec::new();
    for (position, item) in items.into_iter().enumerate() {
        match attempt(item, conversations.len() + 1) {
            Ok(conversation) => {
                observer.report(&Event::ConversationExtracted {
                    index: conversation.index,
                    title: conversation.title.clone(),
                    messages: conversation.messages.len(),
                });
                conversations.push(conversation);
            }
            Err(reason) => observer.report(&Event::ConversationSkipped {
                position: position + 1,
                reason,
            }),
        }
    }
    conversations
}

/// Turns a content value into text segments.
///
/// Strings become a single segment. Arrays contribute their string items and
/// the `text` field of object items; anything else is ignored.
pub(crate) fn content_segments(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => item.get("text")?.as_str().map(str::to_owned),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether any segment has visible text.
pub(crate) fn has_text(segments: &[String]) -> bool {
    segments.iter().any(|s| !s.trim().is_empty())
}

/// The title at `path`, or the platform's placeholder.
pub(crate) fn title_or_default(
    conversation: &Value,
    path: &str,
    platform: Platform,
    index: usize,
) -> String {
    crate::path::resolve_str(conversation, path)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| Conversation::default_title(platform, index), str::to_owned)
}
