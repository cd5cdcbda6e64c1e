// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! The end-to-end pipeline: load, detect, parse, render.
//!
//! Writing files is left to the caller; this module produces named
//! [`Document`]s ready to persist.
//!
//! # Example
//!
//! ```
//! use aiexport::config::Config;
//! use aiexport::export::{extract, load_payload_str, render_documents};
//! use aiexport::renderer::RenderOptions;
//! use aiexport::report::Event;
//! use chrono::Utc;
//!
//! let payload = load_payload_str(
//!     r#"[{"name": "Plans", "chat_messages": [{"sender": "human", "text": "Hi"}]}]"#,
//!     None,
//! ).unwrap();
//!
//! let mut events: Vec<Event> = Vec::new();
//! let extraction = extract(&payload, &Config::default(), None, &mut events).unwrap();
//! let opts = RenderOptions::for_platform(extraction.platform, Utc::now());
//! let documents = render_documents(&extraction.conversations, &["md"], &opts, &mut events);
//!
//! assert_eq!(documents[0].file_name, "001 - Plans.md");
//! ```

use crate::config::Config;
use crate::detect::detect;
use crate::model::Conversation;
use crate::parser::{self, RawPayload};
use crate::platform::Platform;
use crate::renderer::{self, OutputFormat, RenderOptions};
use crate::report::{Event, Observer};
use snafu::prelude::*;
use std::path::{Path, PathBuf};

/// Maximum length, in characters, of the title part of a file name.
pub const MAX_TITLE_CHARS: usize = 150;

const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Error type for run-level failures.
#[derive(Debug, Snafu)]
pub enum ExportError {
    /// The input file could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadInput {
        /// The input path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The input is not valid JSON.
    #[snafu(display("failed to parse JSON: {source}"))]
    ParseJson {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Parsing finished without a single usable conversation.
    #[snafu(display("no conversations found in {platform} export"))]
    NoConversations {
        /// The platform the payload was parsed as.
        platform: Platform,
    },
}

/// Reads an export file into memory.
///
/// Files ending in `.html`/`.htm`, or whose text starts with `<`, are loaded
/// as HTML; everything else must be JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its JSON is malformed.
pub fn load_payload(path: &Path) -> Result<RawPayload, ExportError> {
    let text = std::fs::read_to_string(path).context(ReadInputSnafu { path })?;
    let extension = path.extension().and_then(|ext| ext.to_str());
    load_payload_str(&text, extension)
}

/// Interprets export text already in memory. `extension` is a file
/// extension hint such as `"html"` or `"json"`.
///
/// # Errors
///
/// Returns an error if the text is treated as JSON and fails to parse.
pub fn load_payload_str(text: &str, extension: Option<&str>) -> Result<RawPayload, ExportError> {
    let is_html = extension.is_some_and(|ext| {
        ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
    }) || text.trim_start_matches('\u{feff}').trim_start().starts_with('<');

    if is_html {
        Ok(RawPayload::Html(text.to_owned()))
    } else {
        serde_json::from_str(text)
            .map(RawPayload::Json)
            .context(ParseJsonSnafu)
    }
}

/// The conversations found in one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The platform the payload was parsed as.
    pub platform: Platform,
    /// The extracted conversations, in source order.
    pub conversations: Vec<Conversation>,
}

/// Detects the platform (unless `platform` forces one) and parses `payload`.
///
/// # Errors
///
/// Returns [`ExportError::NoConversations`] if nothing could be extracted.
pub fn extract(
    payload: &RawPayload,
    config: &Config,
    platform: Option<Platform>,
    observer: &mut dyn Observer,
) -> Result<Extraction, ExportError> {
    let platform = platform.unwrap_or_else(|| detect(payload, &config.detection));
    observer.report(&Event::PlatformDetected { platform });

    let conversations = parser::parse(platform, payload, &config.parser(platform), observer);
    ensure!(!conversations.is_empty(), NoConversationsSnafu { platform });

    Ok(Extraction {
        platform,
        conversations,
    })
}

/// One rendered conversation, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Index of the conversation the document was rendered from.
    pub index: usize,
    /// The conversation's title.
    pub title: String,
    /// The document's format.
    pub format: OutputFormat,
    /// File name of the form `001 - Title.md`.
    pub file_name: String,
    /// The rendered document.
    pub body: String,
}

/// Renders every conversation in every named format.
///
/// A format name that is not recognized is reported for each conversation
/// and skipped; the remaining formats and conversations still render.
pub fn render_documents(
    conversations: &[Conversation],
    formats: &[&str],
    opts: &RenderOptions,
    observer: &mut dyn Observer,
) -> Vec<Document> {
    let mut documents = Vec::new();
    for conversation in conversations {
        for name in formats {
            let format = match name.parse::<OutputFormat>() {
                Ok(format) => format,
                Err(err) => {
                    observer.report(&Event::DocumentFailed {
                        index: conversation.index,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let file_name =
                document_file_name(conversation.index, &conversation.title, format.extension());
            observer.report(&Event::DocumentRendered {
                index: conversation.index,
                file_name: file_name.clone(),
            });
            documents.push(Document {
                index: conversation.index,
                title: conversation.title.clone(),
                format,
                file_name,
                body: renderer::render(conversation, format, opts),
            });
        }
    }
    documents
}

/// Makes a title safe for use in a file name.
///
/// Replaces `< > : " / \ | ? *` with `_`, trims surrounding whitespace and
/// keeps at most [`MAX_TITLE_CHARS`] characters. An empty result becomes
/// `untitled`.
#[must_use]
pub fn sanitize_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let sanitized: String = replaced.trim().chars().take(MAX_TITLE_CHARS).collect();
    if sanitized.is_empty() {
        "untitled".to_owned()
    } else {
        sanitized
    }
}

/// Builds `"<3-digit index> - <sanitized title>.<extension>"`.
#[must_use]
pub fn document_file_name(index: usize, title: &str, extension: &str) -> String {
    format!("{index:03} - {}.{extension}", sanitize_filename(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTimestamp;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn opts() -> RenderOptions {
        RenderOptions::for_platform(
            Platform::ChatGpt,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn sanitizes_forbidden_characters() {
        let name = sanitize_filename(r#"A/B: "C"?"#);
        assert_eq!(name, "A_B_ _C__");
        assert!(!name.contains(FORBIDDEN_CHARS));
        assert_eq!(sanitize_filename(r"<a>|b\c*"), "_a__b_c_");
    }

    #[test]
    fn sanitize_trims_and_caps_length() {
        assert_eq!(sanitize_filename("  padded  "), "padded");
        let long = "é".repeat(200);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_TITLE_CHARS);
        assert_eq!(sanitize_filename("   "), "untitled");
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(document_file_name(7, "Chat", "md"), "007 - Chat.md");
        assert_eq!(document_file_name(1234, "A?", "txt"), "1234 - A_.txt");
    }

    #[test]
    fn loads_html_by_extension_or_content() {
        assert!(matches!(
            load_payload_str("plain", Some("HTML")),
            Ok(RawPayload::Html(_))
        ));
        assert!(matches!(
            load_payload_str("\u{feff}  <html></html>", None),
            Ok(RawPayload::Html(_))
        ));
        assert!(matches!(
            load_payload_str(r#"{"a": 1}"#, Some("json")),
            Ok(RawPayload::Json(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(
            load_payload_str("{ nope", Some("json")),
            Err(ExportError::ParseJson { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_payload(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ExportError::ReadInput { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn empty_chatgpt_mapping_is_a_run_level_failure() {
        let payload = RawPayload::Json(json!({}));
        let mut events: Vec<Event> = Vec::new();
        let result = extract(&payload, &Config::default(), None, &mut events);

        assert!(matches!(
            result,
            Err(ExportError::NoConversations {
                platform: Platform::ChatGpt
            })
        ));
    }

    #[test]
    fn forced_platform_skips_detection() {
        let payload = RawPayload::Json(json!([{
            "mapping": { "a": { "message": {
                "author": { "role": "user" }, "content": { "parts": ["x"] }
            }}}
        }]));
        let mut events: Vec<Event> = Vec::new();
        let result = extract(&payload, &Config::default(), Some(Platform::Claude), &mut events);

        assert!(matches!(
            result,
            Err(ExportError::NoConversations {
                platform: Platform::Claude
            })
        ));
        assert_eq!(
            events[0],
            Event::PlatformDetected {
                platform: Platform::Claude
            }
        );
    }

    #[test]
    fn unknown_format_skips_only_that_format() {
        let conversations = vec![Conversation {
            title: "T".into(),
            messages: vec![crate::model::Message {
                author: "user".into(),
                content: vec!["Hi".into()],
                timestamp: Some(RawTimestamp::Seconds(1_700_000_000.0)),
                is_user: true,
            }],
            index: 1,
            platform: Platform::ChatGpt,
        }];
        let mut events: Vec<Event> = Vec::new();
        let documents = render_documents(&conversations, &["pdf", "md", "txt"], &opts(), &mut events);

        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["001 - T.md", "001 - T.txt"]);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::DocumentFailed { index: 1, reason } if reason.contains("pdf")
        )));
    }
}
