//! Tracing options and their validated form

use axum::http::HeaderName;
use forgeboot_core::{usize_from_str_or_int, ConfigError, Properties};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::filter::TraceFilter;
use crate::request_id::DEFAULT_MAX_LENGTH;

/// Options bound from `forgeboot.trace`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceProperties {
    /// Header carrying a propagated request identifier
    pub request_id_header_name: String,

    /// Field name under which the identifier appears in log output
    pub request_id_mdc_key: String,

    /// Path patterns excluded from tracing (static resources by default).
    /// The legacy spelling `ignore_patten` is accepted.
    pub ignore_patterns: Vec<String>,

    /// Longest inbound identifier that is adopted instead of replaced
    #[serde(deserialize_with = "usize_from_str_or_int")]
    pub max_request_id_length: usize,
}

impl Default for TraceProperties {
    fn default() -> Self {
        Self {
            request_id_header_name: "X-Request-Id".to_string(),
            request_id_mdc_key: "requestId".to_string(),
            ignore_patterns: vec![r".*\.(css|js|png|jpg|jpeg|gif|svg)".to_string()],
            max_request_id_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Properties for TraceProperties {
    const PREFIX: &'static str = "forgeboot.trace";
    const ALIASES: &'static [(&'static str, &'static str)] = &[("ignore_patten", "ignore_patterns")];

    fn validate(&self) -> forgeboot_core::Result<()> {
        TraceSettings::from_properties(self).map(|_| ())
    }
}

/// Compiled, validated trace options shared by everything that handles requests
#[derive(Debug, Clone)]
pub struct TraceSettings {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    header_name: HeaderName,
    mdc_key: String,
    filter: TraceFilter,
    max_request_id_length: usize,
}

impl TraceSettings {
    pub fn from_properties(props: &TraceProperties) -> forgeboot_core::Result<Self> {
        let header_name = HeaderName::from_bytes(props.request_id_header_name.trim().as_bytes())
            .map_err(|_| {
                ConfigError::invalid(
                    TraceProperties::field("request_id_header_name"),
                    format!("'{}' is not a valid HTTP header name", props.request_id_header_name),
                )
            })?;

        let mdc_key = props.request_id_mdc_key.trim();
        if mdc_key.is_empty() || mdc_key.contains(char::is_whitespace) {
            return Err(ConfigError::invalid(
                TraceProperties::field("request_id_mdc_key"),
                "must be a non-empty name without whitespace",
            ));
        }

        let filter = TraceFilter::new(&props.ignore_patterns).map_err(|(pattern, err)| {
            ConfigError::invalid(
                TraceProperties::field("ignore_patterns"),
                format!("pattern '{}' does not compile: {}", pattern, err),
            )
        })?;

        if props.max_request_id_length == 0 {
            return Err(ConfigError::invalid(
                TraceProperties::field("max_request_id_length"),
                "must be greater than zero",
            ));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                header_name,
                mdc_key: mdc_key.to_string(),
                filter,
                max_request_id_length: props.max_request_id_length,
            }),
        })
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.inner.header_name
    }

    pub fn mdc_key(&self) -> &str {
        &self.inner.mdc_key
    }

    pub fn filter(&self) -> &TraceFilter {
        &self.inner.filter
    }

    pub fn max_request_id_length(&self) -> usize {
        self.inner.max_request_id_length
    }
}
