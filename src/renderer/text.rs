// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Plain text output.

use super::{RenderOptions, display_segments, format_timestamp};
use crate::model::Conversation;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Renders a conversation as plain text.
#[must_use]
pub fn render(conversation: &Conversation, opts: &RenderOptions) -> String {
    let platform = conversation.platform;
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    writeln!(out, "{}", conversation.title).unwrap();
    writeln!(out, "{}", "=".repeat(RULE_WIDTH)).unwrap();
    writeln!(out, "Platform: {platform}").unwrap();
    writeln!(out, "Participants: {}, {}", opts.user_name, opts.assistant_name).unwrap();
    writeln!(out, "Exported: {}\n", opts.exported()).unwrap();

    for message in &conversation.messages {
        let time = format_timestamp(platform, message.timestamp.as_ref());
        writeln!(out, "{} ({time}):", opts.name_for(message)).unwrap();
        writeln!(out, "{}", display_segments(message, platform).join("\n\n")).unwrap();
        writeln!(out, "{rule}\n").unwrap();
    }

    out
}
