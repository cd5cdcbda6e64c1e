// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! ChatGPT `conversations.json` parsing.
//!
//! ChatGPT stores each conversation's messages as a `mapping` from node id
//! to a wrapper node whose `message` field holds the actual message. Nodes
//! are visited in the order they appear in the file, which is usually but
//! not always chronological.

use super::{
    NoMessagesSnafu, NotAnObjectSnafu, RawPayload, SkipReason, WrongPayloadSnafu, collect,
    content_segments, has_text,
};
use crate::config::{ParserConfig, TimestampKind};
use crate::model::{Conversation, Message, RawTimestamp};
use crate::path::{resolve, resolve_str};
use crate::platform::Platform;
use crate::report::{Event, Observer};
use serde_json::Value;
use snafu::prelude::*;

/// Parses a ChatGPT export.
pub fn parse(
    payload: &RawPayload,
    config: &ParserConfig,
    observer: &mut dyn Observer,
) -> Vec<Conversation> {
    let RawPayload::Json(root) = payload else {
        observer.report(&Event::ConversationSkipped {
            position: 1,
            reason: WrongPayloadSnafu {
                platform: Platform::ChatGpt,
                found: payload.kind(),
            }
            .build(),
        });
        return Vec::new();
    };

    collect(conversation_list(root, config), observer, |raw, index| {
        extract_conversation(raw, index, config)
    })
}

/// Finds the raw conversation objects in a top-level value.
fn conversation_list<'a>(root: &'a Value, config: &ParserConfig) -> Vec<&'a Value> {
    if let Value::Array(items) = root {
        return items.iter().collect();
    }
    let configured = config
        .conversations_path
        .as_deref()
        .and_then(|path| resolve(root, path));
    match configured
        .or_else(|| root.get("conversations"))
        .or_else(|| root.get("items"))
    {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => vec![root],
    }
}

fn extract_conversation(
    raw: &Value,
    index: usize,
    config: &ParserConfig,
) -> Result<Conversation, SkipReason> {
    ensure!(raw.is_object(), NotAnObjectSnafu);

    let messages: Vec<Message> = resolve(raw, &config.messages_path)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|nodes| nodes.values())
        .filter_map(|node| extract_message(node, config))
        .collect();
    ensure!(!messages.is_empty(), NoMessagesSnafu);

    Ok(Conversation {
        title: super::title_or_default(raw, &config.title_path, Platform::ChatGpt, index),
        messages,
        index,
        platform: Platform::ChatGpt,
    })
}

/// Builds a message from a mapping node, if it has author and content.
fn extract_message(node: &Value, config: &ParserConfig) -> Option<Message> {
    let message = match config.message_path.as_deref() {
        Some(path) => resolve(node, path)?,
        None => node,
    };
    if !message.is_object() {
        return None;
    }

    let author = resolve_str(message, &config.author_path)?;
    let content = content_segments(resolve(message, &config.content_path)?);
    if !has_text(&content) {
        return None;
    }

    let timestamp = resolve(message, &config.timestamp_path)
        .and_then(|value| timestamp_of(value, config.timestamp_kind));

    Some(Message {
        author: author.to_owned(),
        is_user: config.user_role() == Some(author),
        content,
        timestamp,
    })
}

/// Reads a timestamp, accepting numeric strings for epoch-based exports.
fn timestamp_of(value: &Value, kind: TimestampKind) -> Option<RawTimestamp> {
    match (RawTimestamp::from_json(value)?, kind) {
        (RawTimestamp::Text(text), TimestampKind::Unix) => Some(
            text.trim()
                .parse::<f64>()
                .map_or(RawTimestamp::Text(text), RawTimestamp::Seconds),
        ),
        (timestamp, _) => Some(timestamp),
    }
}
