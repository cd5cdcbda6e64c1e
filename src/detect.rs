// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Export format detection.
//!
//! Detection never fails: when no rule matches, the configured fallback
//! platform is returned.
//!
//! ```
//! use aiexport::config::DetectionConfig;
//! use aiexport::detect::detect;
//! use aiexport::parser::RawPayload;
//! use aiexport::platform::Platform;
//! use serde_json::json;
//!
//! let payload = RawPayload::Json(json!([{ "uuid": "1", "chat_messages": [] }]));
//! assert_eq!(detect(&payload, &DetectionConfig::default()), Platform::Claude);
//! ```

use crate::config::{DetectionConfig, DetectionRule};
use crate::parser::RawPayload;
use crate::platform::Platform;
use serde_json::Value;

/// Identifies which platform produced `payload`.
#[must_use]
pub fn detect(payload: &RawPayload, config: &DetectionConfig) -> Platform {
    match payload {
        RawPayload::Html(html) => detect_html(html, config),
        RawPayload::Json(value) => {
            let sample = match value {
                Value::Array(items) => items.first().filter(|v| v.is_object()),
                Value::Object(_) => Some(value),
                _ => None,
            };
            sample.map_or(config.fallback_platform, |sample| {
                detect_json(sample, config)
            })
        }
    }
}

fn detect_html(html: &str, config: &DetectionConfig) -> Platform {
    let gemini = DetectionRule::builtin(Platform::Gemini);
    let rules = config.rules();
    let mut fingerprints: Vec<(Platform, &DetectionRule)> = config
        .order()
        .into_iter()
        .filter_map(|p| rules.get(&p).map(|rule| (p, rule)))
        .filter(|(_, rule)| rule.is_html())
        .collect();

    if !fingerprints.iter().any(|(p, _)| *p == Platform::Gemini) {
        fingerprints.push((Platform::Gemini, &gemini));
    }

    fingerprints
        .into_iter()
        .find(|(_, rule)| rule.matches_html(html))
        .map_or(config.fallback_platform, |(p, _)| p)
}

fn detect_json(sample: &Value, config: &DetectionConfig) -> Platform {
    let rules = config.rules();
    config
        .order()
        .into_iter()
        .filter(|p| !p.is_html())
        .find(|p| {
            rules.get(p).is_some_and(|rule| {
                rule.file_patterns.is_empty() && !rule.is_html() && rule.matches_json(sample)
            })
        })
        .unwrap_or(config.fallback_platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonKind;
    use serde_json::json;

    fn json(value: Value) -> RawPayload {
        RawPayload::Json(value)
    }

    #[test]
    fn detects_chatgpt_object() {
        let payload = json(json!({ "title": "T", "mapping": {} }));
        assert_eq!(detect(&payload, &DetectionConfig::default()), Platform::ChatGpt);
    }

    #[test]
    fn detects_claude_from_first_list_element() {
        let payload = json(json!([
            { "uuid": "a", "name": "N", "chat_messages": [] },
            { "mapping": {} }
        ]));
        assert_eq!(detect(&payload, &DetectionConfig::default()), Platform::Claude);
    }

    #[test]
    fn empty_list_falls_back() {
        let mut config = DetectionConfig::default();
        config.fallback_platform = Platform::Claude;
        assert_eq!(detect(&json(json!([])), &config), Platform::Claude);
    }

    #[test]
    fn non_object_head_falls_back() {
        let config = DetectionConfig::default();
        assert_eq!(detect(&json(json!(["chat_messages"])), &config), Platform::ChatGpt);
        assert_eq!(detect(&json(json!(42)), &config), Platform::ChatGpt);
    }

    #[test]
    fn unknown_object_falls_back() {
        let payload = json(json!({ "something": "else" }));
        assert_eq!(detect(&payload, &DetectionConfig::default()), Platform::ChatGpt);
    }

    #[test]
    fn detects_gemini_html() {
        let html = RawPayload::Html(
            r#"<div class="outer-cell mdl-cell"><p>Gemini Apps</p></div>"#.into(),
        );
        assert_eq!(detect(&html, &DetectionConfig::default()), Platform::Gemini);
    }

    #[test]
    fn gemini_fingerprint_is_builtin_with_minimal_rules() {
        let html = RawPayload::Html(r#"<div class="outer-cell">Gemini Apps</div>"#.into());
        assert_eq!(detect(&html, &DetectionConfig::minimal()), Platform::Gemini);
    }

    #[test]
    fn unrecognized_html_falls_back() {
        let html = RawPayload::Html("<html><body>YouTube</body></html>".into());
        assert_eq!(detect(&html, &DetectionConfig::default()), Platform::ChatGpt);
    }

    #[test]
    fn first_match_in_order_wins() {
        let mut config = DetectionConfig::default();
        for rule in config.platforms.values_mut() {
            if !rule.is_html() {
                *rule = DetectionRule {
                    required_keys: vec!["id".into()],
                    ..DetectionRule::default()
                };
            }
        }
        let payload = json(json!({ "id": 1 }));

        config.detection_order = vec![Platform::Claude, Platform::ChatGpt];
        assert_eq!(detect(&payload, &config), Platform::Claude);

        config.detection_order = vec![Platform::ChatGpt, Platform::Claude];
        assert_eq!(detect(&payload, &config), Platform::ChatGpt);
    }

    #[test]
    fn skips_rules_with_file_patterns() {
        let mut config = DetectionConfig::default();
        config.detection_order = vec![Platform::Claude, Platform::ChatGpt];
        config
            .platforms
            .get_mut(&Platform::Claude)
            .unwrap()
            .file_patterns = vec!["*.claude.json".into()];

        let payload = json(json!({ "chat_messages": [] }));
        assert_eq!(detect(&payload, &config), Platform::ChatGpt);
    }

    #[test]
    fn structure_pattern_must_hold() {
        let mut config = DetectionConfig::default();
        config.fallback_platform = Platform::Gemini;
        config
            .platforms
            .get_mut(&Platform::Claude)
            .unwrap()
            .structure_pattern
            .insert("uuid".into(), JsonKind::String);

        let payload = json(json!({ "uuid": 7, "chat_messages": [] }));
        assert_eq!(detect(&payload, &config), Platform::Gemini);
    }
}
