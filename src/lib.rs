// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert AI chat exports into readable documents.
//!
//! This crate turns the data exports of ChatGPT and Claude (JSON) and Gemini
//! (Google Takeout HTML) into one Markdown, HTML or plain text document per
//! conversation.
//!
//! # Overview
//!
//! 1. [`export::load_payload`] reads an export file as JSON or HTML
//! 2. [`detect::detect`] works out which platform produced it
//! 3. [`parser::parse`] normalizes it into [`model::Conversation`]s
//! 4. [`renderer::render`] produces the documents
//!
//! [`export`] ties these steps together. Progress and skipped items are
//! reported through a [`report::Observer`] rather than printed.
//!
//! # Example
//!
//! ```no_run
//! use aiexport::config::Config;
//! use aiexport::export::{extract, load_payload, render_documents};
//! use aiexport::renderer::RenderOptions;
//! use aiexport::report::TracingObserver;
//! use std::path::Path;
//!
//! let payload = load_payload(Path::new("conversations.json")).unwrap();
//! let mut observer = TracingObserver;
//! let extraction = extract(&payload, &Config::default(), None, &mut observer).unwrap();
//!
//! let opts = RenderOptions::for_platform(extraction.platform, chrono::Utc::now());
//! for doc in render_documents(&extraction.conversations, &["md", "html"], &opts, &mut observer) {
//!     std::fs::write(&doc.file_name, doc.body).unwrap();
//! }
//! ```
//!
//! # Modules
//!
//! - [`path`]: dotted-path lookups into JSON values
//! - [`platform`]: the supported export sources
//! - [`model`]: the normalized conversation types
//! - [`config`]: detection rules and parser field paths
//! - [`detect`]: platform detection
//! - [`parser`]: per-platform extraction
//! - [`renderer`]: Markdown, HTML and text output
//! - [`report`]: progress events and observers
//! - [`export`]: the end-to-end pipeline

#![deny(missing_docs)]

pub mod config;
pub mod detect;
pub mod export;
pub mod model;
pub mod parser;
pub mod path;
pub mod platform;
pub mod renderer;
pub mod report;
