//! Forward the current request identifier on outgoing client requests
//!
//! Calls to downstream services carry the identifier under the configured
//! header so their logs line up with ours. Any HTTP client that exposes a
//! `HeaderMap` can use [`inject`].

use axum::http::HeaderMap;

use crate::context;
use crate::properties::TraceSettings;
use crate::request_id::RequestId;

/// Source of the identifier to forward
pub trait RequestIdProvider {
    fn request_id(&self) -> Option<RequestId>;
}

/// Reads the calling execution context's slot
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextProvider;

impl RequestIdProvider for ContextProvider {
    fn request_id(&self) -> Option<RequestId> {
        context::get()
    }
}

/// A fixed identifier, for work that has left its request context
impl RequestIdProvider for RequestId {
    fn request_id(&self) -> Option<RequestId> {
        Some(self.clone())
    }
}

/// Set the configured header on `headers` to the current identifier.
///
/// Returns `false`, leaving `headers` untouched, when there is no current
/// identifier or it cannot be sent as a header value. Both cases are logged
/// as warnings: they mean the request entry point did not install an id.
pub fn inject(settings: &TraceSettings, headers: &mut HeaderMap) -> bool {
    inject_from(&ContextProvider, settings, headers)
}

/// [`inject`] with the identifier taken from `provider`
pub fn inject_from<P>(provider: &P, settings: &TraceSettings, headers: &mut HeaderMap) -> bool
where
    P: RequestIdProvider + ?Sized,
{
    let Some(id) = provider.request_id() else {
        tracing::warn!(
            header = %settings.header_name(),
            "No request id in the current context; was the request entered through RequestContext::run?"
        );
        return false;
    };

    match id.to_header_value() {
        Ok(value) => {
            headers.insert(settings.header_name().clone(), value);
            true
        }
        Err(err) => {
            tracing::warn!(request_id = %id, error = %err, "Request id cannot be forwarded as a header");
            false
        }
    }
}
