// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Detection rules and parser field maps.
//!
//! Platform differences are expressed as data: a [`DetectionRule`] says how
//! to recognize an export, a [`ParserConfig`] says where its fields live.
//! Both can be loaded from a JSON file with [`Config::load`]; anything not
//! supplied falls back to the built-in values.
//!
//! # Example
//!
//! ```
//! use aiexport::config::Config;
//! use aiexport::platform::Platform;
//!
//! let config: Config = serde_json::from_str(r#"{
//!     "parsers": {
//!         "claude": {
//!             "messages_path": "messages",
//!             "title_path": "title",
//!             "author_path": "role",
//!             "content_path": "body",
//!             "timestamp_path": "ts",
//!             "timestamp_kind": "iso8601",
//!             "user_roles": ["human"]
//!         }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.parser(Platform::Claude).messages_path, "messages");
//! assert_eq!(config.parser(Platform::ChatGpt).messages_path, "mapping");
//! ```

use crate::path;
use crate::platform::Platform;
use serde::Deserialize;
use serde_json::Value;
use snafu::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Error type for configuration loading failures.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[snafu(display("failed to read config {}: {source}", path.display()))]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON of the expected shape.
    #[snafu(display("failed to parse config {}: {source}", path.display()))]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// The JSON type a structure pattern expects at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Bool,
    /// JSON `null`.
    Null,
}

impl JsonKind {
    /// Whether `value` has this kind.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Object, Value::Object(_))
                | (Self::Array, Value::Array(_))
                | (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Bool, Value::Bool(_))
                | (Self::Null, Value::Null)
        )
    }
}

/// How to recognize one platform's export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetectionRule {
    /// Key paths that must all resolve in the sample object.
    pub required_keys: Vec<String>,
    /// Key paths that are typical but not required. Informational only.
    pub optional_keys: Vec<String>,
    /// Key paths mapped to the JSON kind their value must have.
    pub structure_pattern: BTreeMap<String, JsonKind>,
    /// File name patterns; a rule carrying any is never used for in-memory JSON.
    pub file_patterns: Vec<String>,
    /// Literal substrings that must all occur in an HTML export.
    pub html_markers: Vec<String>,
}

impl DetectionRule {
    /// Whether this rule recognizes HTML rather than JSON.
    #[must_use]
    pub fn is_html(&self) -> bool {
        !self.html_markers.is_empty()
    }

    /// Whether `sample` satisfies every required key and the structure pattern.
    #[must_use]
    pub fn matches_json(&self, sample: &Value) -> bool {
        self.required_keys
            .iter()
            .all(|key| path::is_present(sample, key))
            && self
                .structure_pattern
                .iter()
                .all(|(key, kind)| path::resolve(sample, key).is_some_and(|v| kind.matches(v)))
    }

    /// Whether every HTML marker occurs in `html`.
    #[must_use]
    pub fn matches_html(&self, html: &str) -> bool {
        self.is_html() && self.html_markers.iter().all(|m| html.contains(m.as_str()))
    }

    fn keys(required: &[&str], optional: &[&str]) -> Self {
        Self {
            required_keys: required.iter().map(|&k| k.to_owned()).collect(),
            optional_keys: optional.iter().map(|&k| k.to_owned()).collect(),
            ..Self::default()
        }
    }

    fn with_kind(mut self, key: &str, kind: JsonKind) -> Self {
        self.structure_pattern.insert(key.to_owned(), kind);
        self
    }

    /// The bundled rule for `platform`.
    #[must_use]
    pub fn builtin(platform: Platform) -> Self {
        match platform {
            Platform::ChatGpt => Self::keys(&["mapping"], &["title", "create_time", "current_node"])
                .with_kind("mapping", JsonKind::Object),
            Platform::Claude => Self::keys(&["chat_messages"], &["uuid", "name", "created_at"])
                .with_kind("chat_messages", JsonKind::Array),
            Platform::Gemini => Self {
                html_markers: vec!["outer-cell".into(), "Gemini Apps".into()],
                ..Self::default()
            },
        }
    }
}

fn default_fallback() -> Platform {
    Platform::ChatGpt
}

fn builtin_rules() -> BTreeMap<Platform, DetectionRule> {
    Platform::ALL
        .into_iter()
        .map(|p| (p, DetectionRule::builtin(p)))
        .collect()
}

/// Detection rules plus the order they are tried in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetectionConfig {
    /// Rules keyed by platform. An explicitly empty map means the minimal
    /// ChatGPT rule; an omitted one means the bundled rules.
    #[serde(default = "builtin_rules")]
    pub platforms: BTreeMap<Platform, DetectionRule>,
    /// Platforms to try, in order. Empty means every configured platform.
    #[serde(default)]
    pub detection_order: Vec<Platform>,
    /// Platform assumed when nothing matches.
    #[serde(default = "default_fallback")]
    pub fallback_platform: Platform,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            platforms: builtin_rules(),
            detection_order: Vec::new(),
            fallback_platform: default_fallback(),
        }
    }
}

impl DetectionConfig {
    /// The configuration used when a caller supplies no rules at all.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            platforms: BTreeMap::from([(
                Platform::ChatGpt,
                DetectionRule::builtin(Platform::ChatGpt),
            )]),
            detection_order: Vec::new(),
            fallback_platform: default_fallback(),
        }
    }

    /// The rules in effect, substituting [`DetectionConfig::minimal`] when empty.
    #[must_use]
    pub fn rules(&self) -> Cow<'_, BTreeMap<Platform, DetectionRule>> {
        if self.platforms.is_empty() {
            Cow::Owned(Self::minimal().platforms)
        } else {
            Cow::Borrowed(&self.platforms)
        }
    }

    /// The platforms to try, in order.
    #[must_use]
    pub fn order(&self) -> Vec<Platform> {
        if self.detection_order.is_empty() {
            self.rules().keys().copied().collect()
        } else {
            self.detection_order.clone()
        }
    }
}

/// How a platform encodes message timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampKind {
    /// Seconds since the Unix epoch, possibly fractional.
    Unix,
    /// An ISO-8601 date-time string.
    Iso8601,
}

/// Where a parser finds each field in a platform's native export.
///
/// Every path is resolved with [`path::resolve`]. The conversation-level
/// paths are relative to a conversation object; author, content and
/// timestamp are relative to the message object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Path to the conversation list inside a top-level object.
    pub conversations_path: Option<String>,
    /// Path to the message container within a conversation.
    pub messages_path: String,
    /// Path from a container entry to the message object, if entries wrap it.
    pub message_path: Option<String>,
    /// Path to the conversation title.
    pub title_path: String,
    /// Path to the author or role.
    pub author_path: String,
    /// Path to the message content.
    pub content_path: String,
    /// Path to the message timestamp.
    pub timestamp_path: String,
    /// How timestamps are encoded.
    pub timestamp_kind: TimestampKind,
    /// Author values that denote the human. Only the first entry is compared.
    pub user_roles: Vec<String>,
}

/// Per-platform parser settings read from a config file.
///
/// Every field is optional; [`ParserOverrides::apply`] fills the gaps from
/// the built-in [`ParserConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOverrides {
    /// Replaces [`ParserConfig::conversations_path`].
    pub conversations_path: Option<String>,
    /// Replaces [`ParserConfig::messages_path`].
    pub messages_path: Option<String>,
    /// Replaces [`ParserConfig::message_path`].
    pub message_path: Option<String>,
    /// Replaces [`ParserConfig::title_path`].
    pub title_path: Option<String>,
    /// Replaces [`ParserConfig::author_path`].
    pub author_path: Option<String>,
    /// Replaces [`ParserConfig::content_path`].
    pub content_path: Option<String>,
    /// Replaces [`ParserConfig::timestamp_path`].
    pub timestamp_path: Option<String>,
    /// Replaces [`ParserConfig::timestamp_kind`].
    pub timestamp_kind: Option<TimestampKind>,
    /// Replaces [`ParserConfig::user_roles`].
    pub user_roles: Option<Vec<String>>,
}

impl ParserOverrides {
    /// Overlays the fields that are set onto `base`.
    #[must_use]
    pub fn apply(&self, base: ParserConfig) -> ParserConfig {
        ParserConfig {
            conversations_path: self.conversations_path.clone().or(base.conversations_path),
            messages_path: self.messages_path.clone().unwrap_or(base.messages_path),
            message_path: self.message_path.clone().or(base.message_path),
            title_path: self.title_path.clone().unwrap_or(base.title_path),
            author_path: self.author_path.clone().unwrap_or(base.author_path),
            content_path: self.content_path.clone().unwrap_or(base.content_path),
            timestamp_path: self.timestamp_path.clone().unwrap_or(base.timestamp_path),
            timestamp_kind: self.timestamp_kind.unwrap_or(base.timestamp_kind),
            user_roles: self.user_roles.clone().unwrap_or(base.user_roles),
        }
    }
}

impl ParserConfig {
    /// The built-in field map for `platform`.
    #[must_use]
    pub fn builtin(platform: Platform) -> Self {
        match platform {
            Platform::ChatGpt => Self {
                conversations_path: None,
                messages_path: "mapping".into(),
                message_path: Some("message".into()),
                title_path: "title".into(),
                author_path: "author.role".into(),
                content_path: "content.parts".into(),
                timestamp_path: "create_time".into(),
                timestamp_kind: TimestampKind::Unix,
                user_roles: vec!["user".into()],
            },
            Platform::Claude => Self {
                conversations_path: None,
                messages_path: "chat_messages".into(),
                message_path: None,
                title_path: "name".into(),
                author_path: "sender".into(),
                content_path: "text".into(),
                timestamp_path: "created_at".into(),
                timestamp_kind: TimestampKind::Iso8601,
                user_roles: vec!["human".into()],
            },
            // Gemini has no schema; only the role literal is consulted.
            Platform::Gemini => Self {
                conversations_path: None,
                messages_path: String::new(),
                message_path: None,
                title_path: String::new(),
                author_path: String::new(),
                content_path: String::new(),
                timestamp_path: String::new(),
                timestamp_kind: TimestampKind::Iso8601,
                user_roles: vec!["user".into()],
            },
        }
    }

    /// The literal author value meaning "the human", if any is configured.
    #[must_use]
    pub fn user_role(&self) -> Option<&str> {
        self.user_roles.first().map(String::as_str)
    }
}

/// Complete configuration: detection rules and per-platform parser maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Detection rules.
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Parser field overrides keyed by platform.
    #[serde(default)]
    pub parsers: BTreeMap<Platform, ParserOverrides>,
}

impl Config {
    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        serde_json::from_str(&text).context(ParseSnafu { path })
    }

    /// The parser config for `platform`: the built-in one with any
    /// configured overrides applied.
    #[must_use]
    pub fn parser(&self, platform: Platform) -> ParserConfig {
        let builtin = ParserConfig::builtin(platform);
        match self.parsers.get(&platform) {
            Some(overrides) => overrides.apply(builtin),
            None => builtin,
        }
    }
}
