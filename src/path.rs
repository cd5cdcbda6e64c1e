// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Dot-separated key path lookups into JSON values.
//!
//! Every parser and the detector address fields through paths such as
//! `author.role` or `content.parts`, so the export layout lives in
//! configuration rather than in code.
//!
//! ```
//! use aiexport::path::resolve;
//! use serde_json::json;
//!
//! let value = json!({ "author": { "role": "user" } });
//! assert_eq!(resolve(&value, "author.role"), Some(&json!("user")));
//! assert_eq!(resolve(&value, "author.name"), None);
//! ```

use serde_json::Value;

/// Walks `path` one object key per segment, starting at `root`.
///
/// Returns `None` if the path is empty, a segment is missing, or an
/// intermediate value is not an object.
#[must_use]
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for key in path.split('.') {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

/// Like [`resolve`] but only succeeds for non-empty strings.
#[must_use]
pub fn resolve_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    resolve(root, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Returns `true` when `path` resolves to any value, including `null`.
#[must_use]
pub fn is_present(root: &Value, path: &str) -> bool {
    resolve(root, path).is_some()
}
