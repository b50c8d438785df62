//! `request-id generate` and `request-id validate`

use forgeboot_trace::{RequestId, Result};

pub fn generate(count: usize) -> Vec<RequestId> {
    (0..count).map(|_| RequestId::generate()).collect()
}

/// Apply the inbound header rules to `value`
pub fn validate(value: &str, max_len: usize) -> Result<RequestId> {
    RequestId::parse_external(value, max_len)
}
