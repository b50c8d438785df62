//! Merged configuration tree and relaxed binding
//!
//! All sources are converted to a single JSON tree whose object keys are
//! normalised to `snake_case`. That makes `request-id-header-name`,
//! `requestIdHeaderName` and `request_id_header_name` the same option,
//! whichever source they come from.

use serde_json::{Map, Value as JsonValue};

use crate::error::{ConfigError, Result};
use crate::properties::Properties;

/// The merged configuration tree, read many times after startup
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: JsonValue,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            root: JsonValue::Object(Map::new()),
        }
    }
}

impl ConfigDocument {
    /// Create an empty document; every bind yields defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a parsed tree, normalising its keys
    pub fn from_value(value: JsonValue) -> Self {
        match normalize_keys(value) {
            root @ JsonValue::Object(_) => Self { root },
            _ => Self::default(),
        }
    }

    /// The raw tree
    pub fn as_value(&self) -> &JsonValue {
        &self.root
    }

    /// Deep-merge `other` over this document. Objects merge key by key;
    /// any other value replaces what was there.
    pub fn merge(&mut self, other: ConfigDocument) {
        merge_values(&mut self.root, other.root);
    }

    /// Set a single value at a dotted path, creating parent sections
    pub fn set(&mut self, path: &str, value: JsonValue) {
        let segments: Vec<String> = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(to_snake_key)
            .collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut node = &mut self.root;
        for segment in parents {
            let JsonValue::Object(map) = node else {
                return;
            };
            let child = map
                .entry(segment.clone())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !child.is_object() {
                *child = JsonValue::Object(Map::new());
            }
            node = child;
        }

        if let JsonValue::Object(map) = node {
            map.insert(last.clone(), normalize_keys(value));
        }
    }

    /// Look up the section at a dotted path
    pub fn section(&self, prefix: &str) -> Option<&JsonValue> {
        prefix
            .split('.')
            .filter(|s| !s.is_empty())
            .try_fold(&self.root, |node, segment| node.get(to_snake_key(segment)))
    }

    /// Rename legacy option names of `T` to their current names.
    ///
    /// Loaders run this on each source before merging, so a legacy name in
    /// one source and the current name in a later one meet on a single key.
    pub fn canonicalize<T: Properties>(&mut self) {
        self.rename_keys(T::PREFIX, T::ALIASES);
    }

    /// Rename `(legacy, current)` keys inside the section at `prefix`
    pub fn rename_keys(&mut self, prefix: &str, aliases: &[(&str, &str)]) {
        if let Some(JsonValue::Object(section)) = self.section_mut(prefix) {
            rename_aliases(section, aliases);
        }
    }

    fn section_mut(&mut self, prefix: &str) -> Option<&mut JsonValue> {
        prefix
            .split('.')
            .filter(|s| !s.is_empty())
            .try_fold(&mut self.root, |node, segment| node.get_mut(to_snake_key(segment)))
    }

    /// Bind and validate one option group.
    ///
    /// A missing section binds to `T::default()`; options absent from the
    /// section keep their defaults.
    pub fn bind<T: Properties>(&self) -> Result<T> {
        let value = match self.section(T::PREFIX) {
            Some(JsonValue::Null) | None => {
                tracing::debug!(prefix = T::PREFIX, "No configuration section, using defaults");
                JsonValue::Object(Map::new())
            }
            Some(section) => {
                let mut section = section.clone();
                if let JsonValue::Object(map) = &mut section {
                    rename_aliases(map, T::ALIASES);
                }
                section
            }
        };

        let bound: T = serde_json::from_value(value).map_err(|source| ConfigError::Bind {
            prefix: T::PREFIX.to_string(),
            source,
        })?;
        bound.validate()?;

        tracing::debug!(prefix = T::PREFIX, "Bound configuration properties");
        Ok(bound)
    }
}

/// Convert an option name in any common spelling to `snake_case`.
///
/// A run of capitals is one word, except that its last capital starts a
/// new word when a lowercase letter follows: `APIPrefix` is `api_prefix`.
pub fn to_snake_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '-' | '_' | ' ' => {
                if !out.ends_with('_') && !out.is_empty() {
                    out.push('_');
                }
            }
            c if c.is_ascii_uppercase() => {
                let prev = i.checked_sub(1).map(|j| chars[j]);
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_ascii_uppercase() => next.map_or(false, |n| n.is_ascii_lowercase()),
                    _ => false,
                };
                if boundary && !out.is_empty() && !out.ends_with('_') {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }

    out
}

fn rename_aliases(section: &mut Map<String, JsonValue>, aliases: &[(&str, &str)]) {
    for (legacy, current) in aliases {
        if let Some(value) = section.remove(*legacy) {
            section.entry(current.to_string()).or_insert(value);
        }
    }
}

fn normalize_keys(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut normalized = Map::new();
            for (key, value) in map {
                let key = to_snake_key(&key);
                let value = normalize_keys(value);
                match normalized.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        normalized.insert(key, value);
                    }
                }
            }
            JsonValue::Object(normalized)
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn merge_values(base: &mut JsonValue, overlay: JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        header_name: String,
        patterns: Vec<String>,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                header_name: "X-Default".to_string(),
                patterns: vec!["a".to_string()],
            }
        }
    }

    impl Properties for Sample {
        const PREFIX: &'static str = "app.sample";
        const ALIASES: &'static [(&'static str, &'static str)] = &[("patten", "patterns")];

        fn validate(&self) -> Result<()> {
            if self.header_name.is_empty() {
                return Err(ConfigError::invalid(Self::field("header_name"), "must not be empty"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_snake_key_spellings() {
        assert_eq!(to_snake_key("requestIdHeaderName"), "request_id_header_name");
        assert_eq!(to_snake_key("request-id-header-name"), "request_id_header_name");
        assert_eq!(to_snake_key("request_id_header_name"), "request_id_header_name");
        assert_eq!(to_snake_key("REQUEST_ID"), "request_id");
        assert_eq!(to_snake_key("webmvc"), "webmvc");
        assert_eq!(to_snake_key("api2Prefix"), "api2_prefix");
        assert_eq!(to_snake_key("APIPrefix"), "api_prefix");
        assert_eq!(to_snake_key("requestIDHeader"), "request_id_header");
        assert_eq!(to_snake_key("HTTP"), "http");
    }

    #[test]
    fn test_bind_accepts_legacy_name() {
        let doc = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "patten": ["x"] } }
        }));
        let bound: Sample = doc.bind().unwrap();
        assert_eq!(bound.patterns, vec!["x".to_string()]);
    }

    #[test]
    fn test_current_name_wins_within_one_source() {
        let doc = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "patten": ["old"], "patterns": ["new"] } }
        }));
        let bound: Sample = doc.bind().unwrap();
        assert_eq!(bound.patterns, vec!["new".to_string()]);
    }

    #[test]
    fn test_canonicalized_sources_merge_on_one_key() {
        let mut base = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "patten": ["from-file"] } }
        }));
        let mut overlay = ConfigDocument::new();
        overlay.set("app.sample.patterns", serde_json::json!(["from-env"]));

        base.canonicalize::<Sample>();
        overlay.canonicalize::<Sample>();
        base.merge(overlay);

        assert!(base.section("app.sample.patten").is_none());
        let bound: Sample = base.bind().unwrap();
        assert_eq!(bound.patterns, vec!["from-env".to_string()]);
    }

    #[test]
    fn test_bind_missing_section_uses_defaults() {
        let doc = ConfigDocument::new();
        assert_eq!(doc.bind::<Sample>().unwrap(), Sample::default());
    }

    #[test]
    fn test_bind_relaxed_names() {
        let doc = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "headerName": "X-Trace" } }
        }));
        let sample: Sample = doc.bind().unwrap();
        assert_eq!(sample.header_name, "X-Trace");
        assert_eq!(sample.patterns, vec!["a".to_string()]);
    }

    #[test]
    fn test_bind_runs_validation() {
        let doc = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "header-name": "" } }
        }));
        let err = doc.bind::<Sample>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_bind_type_mismatch() {
        let doc = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "patterns": 3 } }
        }));
        let err = doc.bind::<Sample>().unwrap_err();
        assert!(matches!(err, ConfigError::Bind { ref prefix, .. } if prefix == "app.sample"));
    }

    #[test]
    fn test_merge_overlays_leaves() {
        let mut base = ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "header_name": "X-A", "patterns": ["a"] } }
        }));
        base.merge(ConfigDocument::from_value(serde_json::json!({
            "app": { "sample": { "patterns": ["b", "c"] } }
        })));

        let sample: Sample = base.bind().unwrap();
        assert_eq!(sample.header_name, "X-A");
        assert_eq!(sample.patterns, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_set_creates_sections() {
        let mut doc = ConfigDocument::new();
        doc.set("app.sample.headerName", serde_json::json!("X-Env"));
        assert_eq!(
            doc.section("app.sample.header_name"),
            Some(&serde_json::json!("X-Env"))
        );
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut doc = ConfigDocument::from_value(serde_json::json!({ "app": "flat" }));
        doc.set("app.sample.header_name", serde_json::json!("X"));
        assert!(doc.section("app.sample").is_some());
    }

    proptest! {
        #[test]
        fn prop_snake_key_is_idempotent(key in "[a-zA-Z][a-zA-Z0-9_-]{0,24}") {
            let once = to_snake_key(&key);
            prop_assert_eq!(to_snake_key(&once), once.clone());
            prop_assert!(!once.contains('-'));
        }
    }
}
