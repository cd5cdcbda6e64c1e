// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Claude `conversations.json` parsing.
//!
//! Claude exports are either a list of conversations, an object with a
//! `conversations` list, or a single conversation object carrying its
//! `chat_messages` array directly.

use super::{
    NoMessagesSnafu, NotAnObjectSnafu, RawPayload, SkipReason, WrongPayloadSnafu, collect,
    content_segments, has_text,
};
use crate::config::ParserConfig;
use crate::model::{Conversation, Message, RawTimestamp};
use crate::path::{resolve, resolve_str};
use crate::platform::Platform;
use crate::report::{Event, Observer};
use serde_json::Value;
use snafu::prelude::*;

/// Parses a Claude export.
pub fn parse(
    payload: &RawPayload,
    config: &ParserConfig,
    observer: &mut dyn Observer,
) -> Vec<Conversation> {
    let RawPayload::Json(root) = payload else {
        observer.report(&Event::ConversationSkipped {
            position: 1,
            reason: WrongPayloadSnafu {
                platform: Platform::Claude,
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

fn conversation_list<'a>(root: &'a Value, config: &ParserConfig) -> Vec<&'a Value> {
    if let Value::Array(items) = root {
        return items.iter().collect();
    }
    let listed = config
        .conversations_path
        .as_deref()
        .and_then(|path| resolve(root, path))
        .or_else(|| root.get("conversations"));
    match listed {
        Some(Value::Array(items)) => items.iter().collect(),
        // A lone conversation (`chat_messages` at the top) or an unknown
        // shape parsed as one conversation.
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
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|message| extract_message(message, config))
        .collect();
    ensure!(!messages.is_empty(), NoMessagesSnafu);

    Ok(Conversation {
        title: super::title_or_default(raw, &config.title_path, Platform::Claude, index),
        messages,
        index,
        platform: Platform::Claude,
    })
}

fn extract_message(message: &Value, config: &ParserConfig) -> Option<Message> {
    if !message.is_object() {
        return None;
    }
    let sender = resolve_str(message, &config.author_path)?;
    let content = content_segments(resolve(message, &config.content_path)?);
    if !has_text(&content) {
        return None;
    }

    Some(Message {
        author: sender.to_owned(),
        is_user: config.user_role() == Some(sender),
        content,
        timestamp: resolve(message, &config.timestamp_path).and_then(RawTimestamp::from_json),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: Value) -> Vec<Conversation> {
        let config = ParserConfig::builtin(Platform::Claude);
        parse(&RawPayload::Json(value), &config, &mut Vec::<Event>::new())
    }

    fn conversation(name: &str) -> Value {
        json!({
            "uuid": name,
            "name": name,
            "chat_messages": [
                { "sender": "human", "text": "Hello", "created_at": "2024-05-01T10:00:00.123Z" },
                { "sender": "assistant", "text": "Hi!", "created_at": "2024-05-01T10:00:05Z" }
            ]
        })
    }

    #[test]
    fn parses_bare_list_in_order() {
        let conversations = run(json!([conversation("one"), conversation("two")]));

        let titles: Vec<_> = conversations.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two"]);
        assert_eq!(conversations[1].index, 2);
        assert!(conversations.iter().all(|c| c.platform == Platform::Claude));
    }

    #[test]
    fn parses_conversations_key() {
        let conversations = run(json!({ "conversations": [conversation("a"), conversation("b")] }));
        assert_eq!(conversations.len(), 2);
    }

    #[test]
    fn parses_single_chat_messages_object() {
        let conversations = run(conversation("solo"));
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].title, "solo");
    }

    #[test]
    fn marks_human_sender_as_user() {
        let conversations = run(json!([conversation("x")]));
        let messages = &conversations[0].messages;

        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user);
        assert_eq!(messages[0].author, "human");
        assert!(!messages[1].is_user);
        assert_eq!(
            messages[0].timestamp,
            Some(RawTimestamp::Text("2024-05-01T10:00:00.123Z".into()))
        );
    }

    #[test]
    fn skips_incomplete_messages_silently() {
        let conversations = run(json!([{
            "name": "Partial",
            "chat_messages": [
                "not a message",
                { "sender": "human" },
                { "text": "orphan" },
                { "sender": "assistant", "text": "" },
                { "sender": "assistant", "content": [{ "type": "text", "text": "ignored" }] },
                { "sender": "assistant", "text": "kept" }
            ]
        }]));

        let messages = &conversations[0].messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, vec!["kept"]);
    }

    #[test]
    fn unnamed_conversation_gets_placeholder() {
        let conversations = run(json!([{
            "name": "",
            "chat_messages": [{ "sender": "human", "text": "Hi" }]
        }]));
        assert_eq!(conversations[0].title, "Claude Conversation 1");
    }

    #[test]
    fn unknown_shape_is_parsed_best_effort() {
        let mut events: Vec<Event> = Vec::new();
        let config = ParserConfig::builtin(Platform::Claude);
        let conversations = parse(
            &RawPayload::Json(json!({ "something": [] })),
            &config,
            &mut events,
        );

        assert!(conversations.is_empty());
        assert_eq!(
            events,
            vec![Event::ConversationSkipped {
                position: 1,
                reason: SkipReason::NoMessages,
            }]
        );
    }

    #[test]
    fn only_first_human_role_counts() {
        let mut config = ParserConfig::builtin(Platform::Claude);
        config.user_roles = vec!["human".into(), "user".into()];
        let payload = RawPayload::Json(json!([{
            "chat_messages": [
                { "sender": "user", "text": "a" },
                { "sender": "human", "text": "b" }
            ]
        }]));

        let conversations = parse(&payload, &config, &mut Vec::<Event>::new());
        let flags: Vec<_> = conversations[0].messages.iter().map(|m| m.is_user).collect();
        assert_eq!(flags, vec![false, true]);
    }
}
