// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown output.
//!
//! The document starts with YAML front matter describing the export,
//! followed by a `#` title and one `###` section per message.

use super::{RenderOptions, display_segments, format_timestamp};
use crate::model::Conversation;
use serde::Serialize;
use std::fmt::Write;

/// Closing line of every Markdown document.
pub const FOOTER: &str = "*Exported with aiexport*";

/// The YAML header at the top of each document.
#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    generated: String,
    user: &'a str,
    assistant: &'a str,
    platform: &'static str,
}

fn front_matter(conversation: &Conversation, opts: &RenderOptions) -> String {
    let header = FrontMatter {
        title: &conversation.title,
        generated: opts.exported(),
        user: &opts.user_name,
        assistant: &opts.assistant_name,
        platform: conversation.platform.display_name(),
    };
    serde_yaml::to_string(&header)
        .unwrap_or_else(|err| panic!("failed to serialize front matter: {err}"))
}

/// Renders a conversation as Markdown.
#[must_use]
pub fn render(conversation: &Conversation, opts: &RenderOptions) -> String {
    let platform = conversation.platform;
    let mut out = String::new();

    writeln!(out, "---").unwrap();
    out.push_str(&front_matter(conversation, opts));
    writeln!(out, "---\n").unwrap();

    writeln!(out, "# {}\n", conversation.title).unwrap();

    for message in &conversation.messages {
        let time = format_timestamp(platform, message.timestamp.as_ref());
        writeln!(out, "### {} — {time}\n", opts.name_for(message)).unwrap();
        for segment in display_segments(message, platform) {
            writeln!(out, "{segment}\n").unwrap();
        }
    }

    writeln!(out, "---\n\n{FOOTER}").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTimestamp;
    use crate::platform::Platform;
    use crate::renderer::tests::{conversation, message, opts};
    use std::collections::BTreeMap;

    /// Splits off the YAML between the opening and closing `---` lines.
    fn parse_front_matter(output: &str) -> BTreeMap<String, String> {
        let rest = output.strip_prefix("---\n").expect("missing opening fence");
        let (yaml, _) = rest.split_once("\n---\n").expect("missing closing fence");
        serde_yaml::from_str(yaml).expect("front matter is not valid YAML")
    }

    #[test]
    fn renders_front_matter_and_title() {
        let conv = conversation(Platform::Claude, vec![message(true, &["Hi"], None)]);
        let output = render(&conv, &opts());

        let front = parse_front_matter(&output);
        assert_eq!(front["title"], "Test Chat");
        assert_eq!(front["generated"], "2025-01-02 03:04");
        assert_eq!(front["user"], "Alice");
        assert_eq!(front["assistant"], "Bot");
        assert_eq!(front["platform"], "Claude");
        assert!(output.contains("\n---\n\n# Test Chat\n\n"));
    }

    #[test]
    fn front_matter_survives_control_characters_and_quotes() {
        let mut conv = conversation(Platform::ChatGpt, vec![message(true, &["Hi"], None)]);
        conv.title = "Bell\u{7} and\rCR: \"quoted\" \\ \u{1b}[0m\nnext".into();
        let mut names = opts();
        names.user_name = "- not a list".into();
        names.assistant_name = "#nope".into();
        let output = render(&conv, &names);

        let front = parse_front_matter(&output);
        assert_eq!(front["title"], conv.title);
        assert_eq!(front["user"], "- not a list");
        assert_eq!(front["assistant"], "#nope");
    }

    #[test]
    fn renders_messages_with_names_and_times() {
        let conv = conversation(
            Platform::ChatGpt,
            vec![
                message(true, &["Question?"], Some(RawTimestamp::Seconds(1_700_000_000.0))),
                message(false, &["First part", "  ", "Second part "], None),
            ],
        );
        let output = render(&conv, &opts());

        assert!(output.contains("### Alice — 2023-11-14 22:13\n\nQuestion?\n\n"));
        assert!(output.contains("### Bot — Unknown\n\nFirst part\n\nSecond part\n\n"));
    }

    #[test]
    fn ends_with_footer() {
        let conv = conversation(Platform::ChatGpt, vec![message(true, &["Hi"], None)]);
        assert!(render(&conv, &opts()).ends_with("---\n\n*Exported with aiexport*\n"));
    }

    #[test]
    fn normalizes_gemini_paragraphs() {
        let conv = conversation(
            Platform::Gemini,
            vec![message(
                false,
                &["One\n\n\n\n  Two  \n\nThree"],
                Some(RawTimestamp::Text("Oct 1, 2025, 1:00:00 PM PST".into())),
            )],
        );
        let output = render(&conv, &opts());

        assert!(output.contains("### Bot — Oct 1, 2025, 1:00:00 PM PST\n\nOne\n\nTwo\n\nThree\n\n"));
    }
}
