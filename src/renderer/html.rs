// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Standalone HTML output.
//!
//! Pages carry their own stylesheet and no external assets, so a document
//! can be opened directly from disk.

use super::{RenderOptions, display_segments, format_timestamp};
use crate::model::Conversation;
use std::fmt::Write;

const STYLE: &str = r"
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; background: #f4f5f7; color: #1f2328; margin: 0; }
.container { max-width: 860px; margin: 0 auto; padding: 24px; }
header { background: #ffffff; border-radius: 8px; padding: 16px 24px; margin-bottom: 24px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
header h1 { margin: 0 0 8px; font-size: 1.6em; }
.meta { margin: 2px 0; color: #57606a; font-size: 0.9em; }
.message { border-radius: 8px; padding: 12px 16px; margin-bottom: 16px; border-left: 4px solid; }
.message.user { background: #e8f1fd; border-color: #2f6fde; }
.message.assistant { background: #eef8ef; border-color: #2e9a47; }
.author { font-weight: 600; margin-bottom: 6px; }
.timestamp { font-weight: normal; color: #6e7781; font-size: 0.85em; margin-left: 8px; }
.content { line-height: 1.55; overflow-wrap: anywhere; }
";

/// Escapes `&`, `<` and `>`.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes text and turns line breaks into `<br>`.
fn escape_multiline(text: &str) -> String {
    escape(text).replace('\n', "<br>\n")
}

/// Renders a conversation as an HTML page.
#[must_use]
pub fn render(conversation: &Conversation, opts: &RenderOptions) -> String {
    let platform = conversation.platform;
    let title = escape(&conversation.title);
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>").unwrap();
    writeln!(out, "<html lang=\"en\">\n<head>").unwrap();
    writeln!(out, "<meta charset=\"utf-8\">").unwrap();
    writeln!(out, "<title>{title}</title>").unwrap();
    writeln!(out, "<style>{STYLE}</style>").unwrap();
    writeln!(out, "</head>\n<body>\n<div class=\"container\">").unwrap();

    writeln!(out, "<header>\n<h1>{title}</h1>").unwrap();
    writeln!(
        out,
        "<p class=\"meta\"><strong>Participants:</strong> {} &amp; {}</p>",
        escape(&opts.user_name),
        escape(&opts.assistant_name)
    )
    .unwrap();
    writeln!(out, "<p class=\"meta\"><strong>Platform:</strong> {platform}</p>").unwrap();
    writeln!(
        out,
        "<p class=\"meta\"><strong>Exported:</strong> {}</p>",
        opts.exported()
    )
    .unwrap();
    writeln!(out, "</header>").unwrap();

    for message in &conversation.messages {
        let role = if message.is_user { "user" } else { "assistant" };
        let time = format_timestamp(platform, message.timestamp.as_ref());
        let body = display_segments(message, platform).join("\n\n");

        writeln!(out, "<div class=\"message {role}\">").unwrap();
        writeln!(
            out,
            "<div class=\"author\">{}<span class=\"timestamp\">{}</span></div>",
            escape(opts.name_for(message)),
            escape(&time)
        )
        .unwrap();
        writeln!(out, "<div class=\"content\">{}</div>", escape_multiline(&body)).unwrap();
        writeln!(out, "</div>").unwrap();
    }

    writeln!(out, "</div>\n</body>\n</html>").unwrap();
    out
}
