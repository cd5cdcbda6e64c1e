// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Progress and diagnostic events emitted by the pipeline.
//!
//! The library never prints. Instead it hands [`Event`]s to an [`Observer`]
//! supplied by the caller: [`TracingObserver`] forwards them to `tracing`,
//! and a `Vec<Event>` simply collects them.

use crate::parser::SkipReason;
use crate::platform::Platform;

/// Something noteworthy that happened while extracting or rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The payload was identified as coming from `platform`.
    PlatformDetected {
        /// The detected (or forced) platform.
        platform: Platform,
    },
    /// A Gemini conversation block was located in the HTML.
    BlockFound {
        /// 1-based position of the block in the document.
        position: usize,
    },
    /// A conversation was extracted.
    ConversationExtracted {
        /// The conversation's assigned index.
        index: usize,
        /// The conversation's title.
        title: String,
        /// Number of retained messages.
        messages: usize,
    },
    /// A conversation or block could not be extracted and was dropped.
    ConversationSkipped {
        /// 1-based position of the item in the source.
        position: usize,
        /// Why it was dropped.
        reason: SkipReason,
    },
    /// A document was rendered for a conversation.
    DocumentRendered {
        /// The conversation's index.
        index: usize,
        /// The document's file name.
        file_name: String,
    },
    /// A document could not be produced for a conversation.
    DocumentFailed {
        /// The conversation's index.
        index: usize,
        /// Human-readable failure description.
        reason: String,
    },
}

/// A sink for pipeline [`Event`]s.
pub trait Observer {
    /// Receives one event.
    fn report(&mut self, event: &Event);
}

impl Observer for Vec<Event> {
    fn report(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Forwards events to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn report(&mut self, event: &Event) {
        match event {
            Event::PlatformDetected { platform } => {
                tracing::info!(%platform, "detected export format");
            }
            Event::BlockFound { position } => {
                tracing::debug!(position, "found conversation block");
            }
            Event::ConversationExtracted {
                index,
                title,
                messages,
            } => {
                tracing::debug!(index, title, messages, "extracted conversation");
            }
            Event::ConversationSkipped { position, reason } => {
                tracing::warn!(position, %reason, "skipped conversation");
            }
            Event::DocumentRendered { index, file_name } => {
                tracing::debug!(index, file_name, "rendered document");
            }
            Event::DocumentFailed { index, reason } => {
                tracing::warn!(index, reason, "failed to render document");
            }
        }
    }
}
