//! The request identifier token

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, TraceError};

/// Default upper bound for identifiers adopted from inbound headers
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// A string token correlating all log output for one request.
///
/// Generated identifiers are random UUID v4 values in hyphenated form.
/// Identifiers built with `From` are taken as-is; use
/// [`RequestId::parse_external`] when the value comes from outside the
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validate an identifier received from an upstream caller.
    ///
    /// Surrounding whitespace is trimmed. The result must be non-empty, at
    /// most `max_len` bytes, and consist of visible ASCII only, so it is
    /// safe to echo in a response header and to write into log lines.
    pub fn parse_external(value: &str, max_len: usize) -> Result<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(TraceError::invalid_request_id("empty value"));
        }
        if value.len() > max_len {
            return Err(TraceError::invalid_request_id(format!(
                "{} bytes exceeds limit of {}",
                value.len(),
                max_len
            )));
        }
        if let Some(c) = value.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(TraceError::invalid_request_id(format!(
                "character {:?} is not allowed",
                c
            )));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Render as an HTTP header value
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.0)
            .map_err(|_| TraceError::invalid_request_id("not a valid header value"))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
