// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Identifiers for the supported export sources.

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use std::str::FromStr;

/// A chat platform whose export format can be parsed.
///
/// The lowercase name (`chatgpt`, `claude`, `gemini`) is used in
/// configuration files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// OpenAI ChatGPT `conversations.json`.
    ChatGpt,
    /// Anthropic Claude `conversations.json`.
    Claude,
    /// Google Gemini activity from a Takeout HTML export.
    Gemini,
}

impl Platform {
    /// Every known platform, in default detection order.
    pub const ALL: [Self; 3] = [Self::ChatGpt, Self::Claude, Self::Gemini];

    /// The identifier used in configuration and on the command line.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        }
    }

    /// The human-readable product name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ChatGpt => "ChatGPT",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
        }
    }

    /// Whether this platform exports HTML rather than JSON.
    #[must_use]
    pub const fn is_html(self) -> bool {
        matches!(self, Self::Gemini)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Snafu)]
#[snafu(display("unknown platform {name:?} (expected chatgpt, claude or gemini)"))]
pub struct UnknownPlatform {
    /// The name that failed to parse.
    name: String,
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.id() == lower)
            .context(UnknownPlatformSnafu { name: s })
    }
}
