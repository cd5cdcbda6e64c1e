// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Lightweight HTML-to-text conversion.
//!
//! This is a pattern-based conversion for the small, regular markup found in
//! Takeout activity exports, not a general HTML parser.
//!
//! ```
//! use aiexport::parser::html::to_text;
//!
//! assert_eq!(to_text("<p>One</p><p>Two &amp; three</p>"), "\n\nOne\n\nTwo & three");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap_or_else(|err| panic!("invalid built-in pattern {re:?}: {err}"))
}

/// Tag rewrites applied in order before all remaining tags are stripped.
static TAG_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (pattern(r"(?i)<p(?:\s[^>]*)?>"), "\n\n"),
        (pattern(r"(?i)</p\s*>"), ""),
        (pattern(r"(?i)<br\s*/?>"), "\n"),
        (pattern(r"(?i)<div(?:\s[^>]*)?>"), "\n"),
        (pattern(r"(?i)<li(?:\s[^>]*)?>"), "\n• "),
        (pattern(r"(?i)<h[1-6](?:\s[^>]*)?>"), "\n## "),
    ]
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| pattern(r"<[^>]+>"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| pattern(r"\n{3,}"));
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| pattern(r"[ \t]+"));
static LEADING_SPACE: Lazy<Regex> = Lazy::new(|| pattern(r"\n "));

/// Named entities decoded after tag stripping. `&amp;` comes last so that
/// `&amp;lt;` decodes to the literal text `&lt;`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&#x27;", "'"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&lsquo;", "‘"),
    ("&rsquo;", "’"),
    ("&ldquo;", "“"),
    ("&rdquo;", "”"),
    ("&hellip;", "…"),
    ("&amp;", "&"),
];

/// Decodes the fixed table of named entities.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_owned(), |acc, (entity, plain)| acc.replace(entity, plain))
}

/// Converts an HTML fragment to plain text.
///
/// Paragraphs become blank-line separated, `<br>` and `<div>` become line
/// breaks, list items get a `•` bullet and headings a `##` marker. Other tags
/// are dropped, entities decoded, and whitespace collapsed.
#[must_use]
pub fn to_text(html: &str) -> String {
    let mut text = TAG_RULES
        .iter()
        .fold(html.to_owned(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        });
    text = ANY_TAG.replace_all(&text, "").into_owned();
    text = decode_entities(&text);
    text = EXCESS_NEWLINES.replace_all(&text, "\n\n").into_owned();
    text = HORIZONTAL_SPACE.replace_all(&text, " ").into_owned();
    LEADING_SPACE.replace_all(&text, "\n").into_owned()
}
