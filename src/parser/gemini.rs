// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Gemini activity parsing from Google Takeout `My Activity.html`.
//!
//! The export has no machine-readable structure. Each activity entry is an
//! `outer-cell` card whose `content-cell` holds the prompt line, a display
//! timestamp, the response text and some footer boilerplate:
//!
//! ```text
//! <div class="outer-cell mdl-cell ..."><div class="mdl-grid">
//!   <div class="header-cell ...">Gemini Apps</div>
//!   <div class="content-cell ...">Prompted What is Rust?<br>
//!     Nov 11, 2025, 9:04:17 PM PST<br><p>Rust is ...</p></div>
//!   ...
//! </div></div></div>
//! ```
//!
//! Segmentation relies on that exact nesting: a card is everything up to the
//! first `</div></div></div>`, and the content cell ends at its first
//! `</div>`. Extra wrapper divs in a future export format will truncate or
//! merge cards.

use super::html::to_text;
use super::{
    MissingContentCellSnafu, NoPromptSnafu, RawPayload, SkipReason, WrongPayloadSnafu, collect,
};
use crate::config::ParserConfig;
use crate::model::{Conversation, Message, RawTimestamp};
use crate::platform::Platform;
use crate::report::{Event, Observer};
use once_cell::sync::Lazy;
use regex::Regex;
use snafu::prelude::*;

static OUTER_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="outer-cell[^"]*">(.*?)</div></div></div>"#)
        .unwrap_or_else(|err| panic!("invalid outer-cell pattern: {err}"))
});

static CONTENT_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class="content-cell[^"]*">"#)
        .unwrap_or_else(|err| panic!("invalid content-cell pattern: {err}"))
});

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][a-z]{2} \d{1,2}, \d{4}, \d{1,2}:\d{2}:\d{2}\s[AP]M [A-Z]{3}$")
        .unwrap_or_else(|err| panic!("invalid timestamp pattern: {err}"))
});

const PROMPT_MARKERS: [&str; 2] = ["Prompted", "Created"];
const FOOTER_MARKERS: [&str; 2] = ["Products:", "Why is this here?"];
const TITLE_WORDS: usize = 8;

/// Author name given to the AI side of a Gemini exchange.
pub const ASSISTANT_AUTHOR: &str = "Gemini";

/// Parses a Gemini Takeout activity page.
///
/// Each card with a prompt becomes a conversation of one user message and,
/// when the card has response text, one AI message. Both share the card's
/// display timestamp.
pub fn parse(
    payload: &RawPayload,
    config: &ParserConfig,
    observer: &mut dyn Observer,
) -> Vec<Conversation> {
    let RawPayload::Html(html) = payload else {
        observer.report(&Event::ConversationSkipped {
            position: 1,
            reason: WrongPayloadSnafu {
                platform: Platform::Gemini,
                found: payload.kind(),
            }
            .build(),
        });
        return Vec::new();
    };

    let blocks: Vec<&str> = OUTER_CELL
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();
    for position in 1..=blocks.len() {
        observer.report(&Event::BlockFound { position });
    }

    let user_author = config.user_role().unwrap_or("user");
    collect(blocks, observer, |block, index| {
        extract_block(block, index, user_author)
    })
}

/// Returns the text of the block's content cell.
fn content_region(block: &str) -> Option<&str> {
    let start = CONTENT_CELL.find(block)?.end();
    let rest = &block[start..];
    Some(rest.find("</div>").map_or(rest, |end| &rest[..end]))
}

/// Strips a `Prompted`/`Created` marker followed by a regular or
/// non-breaking space, returning the remainder.
#[must_use]
pub fn strip_prompt_marker(line: &str) -> Option<&str> {
    PROMPT_MARKERS.iter().find_map(|marker| {
        let rest = line.strip_prefix(marker)?;
        rest.strip_prefix(' ')
            .or_else(|| rest.strip_prefix('\u{a0}'))
            .map(str::trim)
    })
}

/// Whether `line` has the shape of a Takeout display timestamp,
/// e.g. `Nov 11, 2025, 9:04:17 PM PST`.
#[must_use]
pub fn is_timestamp(line: &str) -> bool {
    TIMESTAMP.is_match(line)
}

fn is_footer(line: &str) -> bool {
    FOOTER_MARKERS.iter().any(|marker| line.starts_with(marker))
}

/// The prompt, timestamp and response lines recovered from one card.
#[derive(Debug, Default, PartialEq, Eq)]
struct Exchange<'a> {
    prompt: Option<&'a str>,
    timestamp: Option<&'a str>,
    response: Vec<&'a str>,
}

fn classify_lines(text: &str) -> Exchange<'_> {
    let mut exchange = Exchange::default();
    let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    for line in lines {
        if exchange.prompt.is_none() {
            exchange.prompt = strip_prompt_marker(line);
            continue;
        }
        if is_timestamp(line) {
            if exchange.timestamp.is_none() {
                exchange.timestamp = Some(line);
            }
            continue;
        }
        if !is_footer(line) {
            exchange.response.push(line);
        }
    }
    exchange
}

/// First words of the prompt, with `...` when the prompt reaches the limit.
fn title_from_prompt(prompt: &str) -> String {
    let words: Vec<&str> = prompt.split_whitespace().collect();
    let mut title = words
        .iter()
        .take(TITLE_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() >= TITLE_WORDS {
        title.push_str("...");
    }
    title
}

fn extract_block(block: &str, index: usize, user_author: &str) -> Result<Conversation, SkipReason> {
    let region = content_region(block).context(MissingContentCellSnafu)?;
    let text = to_text(region);
    let exchange = classify_lines(&text);

    let prompt = exchange
        .prompt
        .filter(|p| !p.is_empty())
        .context(NoPromptSnafu)?;
    let timestamp = exchange
        .timestamp
        .map(|ts| RawTimestamp::Text(ts.to_owned()));

    let mut messages = vec![Message {
        author: user_author.to_owned(),
        content: vec![prompt.to_owned()],
        timestamp: timestamp.clone(),
        is_user: true,
    }];

    let response = exchange.response.join("\n");
    let response = response.trim();
    if !response.is_empty() {
        messages.push(Message {
            author: ASSISTANT_AUTHOR.to_owned(),
            content: vec![response.to_owned()],
            timestamp,
            is_user: false,
        });
    }

    Ok(Conversation {
        title: title_from_prompt(prompt),
        messages,
        index,
        platform: Platform::Gemini,
    })
}
