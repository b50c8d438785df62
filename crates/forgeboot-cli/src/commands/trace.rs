//! `trace skip`

use anyhow::Context;
use axum::http::Method;
use forgeboot_trace::TraceSettings;
use serde_json::json;

/// Decide whether a request would bypass request-id handling
pub fn skip(settings: &TraceSettings, method: &str, path: &str) -> anyhow::Result<serde_json::Value> {
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method '{}'", method))?;
    let skipped = settings.filter().should_skip(&method, path);

    tracing::debug!(%method, path, skipped, "Evaluated trace filter");

    Ok(json!({
        "method": method.as_str(),
        "path": path,
        "skip": skipped,
    }))
}
