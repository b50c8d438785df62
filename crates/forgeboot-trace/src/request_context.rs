//! Explicit per-request context object and its Axum extractor
//!
//! A [`RequestContext`] is created once at request entry, from the inbound
//! headers, and owned by the request. [`RequestContext::run`] executes the
//! request body inside a task-local scope carrying the identifier, so
//! [`crate::context::get`] works anywhere below it and nothing is left
//! behind when the body finishes.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use tracing::Instrument;

use crate::context;
use crate::error::TraceError;
use crate::properties::TraceSettings;
use crate::request_id::RequestId;

/// Where the request identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdOrigin {
    /// Generated by this process
    Generated,
    /// Adopted from an inbound header
    Propagated,
}

/// The identifier and metadata of one in-flight request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    request_id: RequestId,
    origin: IdOrigin,
}

impl RequestContext {
    /// A context with a freshly generated identifier
    pub fn generate() -> Self {
        Self {
            request_id: RequestId::generate(),
            origin: IdOrigin::Generated,
        }
    }

    /// A context for an identifier supplied by the caller
    pub fn with_id(request_id: impl Into<RequestId>) -> Self {
        Self {
            request_id: request_id.into(),
            origin: IdOrigin::Propagated,
        }
    }

    /// Adopt the configured header's identifier, or generate one.
    ///
    /// A header value that fails [`RequestId::parse_external`] is not
    /// trusted: it is logged and replaced by a generated identifier.
    pub fn from_headers(settings: &TraceSettings, headers: &HeaderMap) -> Self {
        let Some(raw) = headers.get(settings.header_name()) else {
            return Self::generate();
        };

        let parsed = raw
            .to_str()
            .map_err(|_| TraceError::invalid_request_id("header is not visible ASCII"))
            .and_then(|value| RequestId::parse_external(value, settings.max_request_id_length()));

        match parsed {
            Ok(request_id) => Self {
                request_id,
                origin: IdOrigin::Propagated,
            },
            Err(err) => {
                let ctx = Self::generate();
                tracing::warn!(
                    header = %settings.header_name(),
                    error = %err,
                    request_id = %ctx.request_id,
                    "Rejected inbound request id, generated a new one"
                );
                ctx
            }
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn origin(&self) -> IdOrigin {
        self.origin
    }

    /// Header pair echoing the identifier back to the caller
    pub fn response_header(&self, settings: &TraceSettings) -> Option<(HeaderName, HeaderValue)> {
        self.request_id
            .to_header_value()
            .ok()
            .map(|value| (settings.header_name().clone(), value))
    }

    /// Span grouping every event emitted while handling this request
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            origin = ?self.origin
        )
    }

    /// Run the request body with this identifier as the current one
    pub async fn run<F: Future>(self, fut: F) -> F::Output {
        let span = self.span();
        tracing::debug!(parent: &span, "Request id installed");
        context::scope_with(self.request_id, fut.instrument(span)).await
    }
}

/// Extracts the request's context.
///
/// A context already stored in the request extensions by the host wins;
/// otherwise one is built from the headers with the [`TraceSettings`]
/// found in the router state and stored for later extractors.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
    TraceSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(ctx.clone());
        }

        let settings = TraceSettings::from_ref(state);
        let ctx = RequestContext::from_headers(&settings, &parts.headers);
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::TraceProperties;
    use crate::request_id::DEFAULT_MAX_LENGTH;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn settings() -> TraceSettings {
        TraceSettings::from_properties(&TraceProperties::default()).unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_adopts_valid_header() {
        let ctx = RequestContext::from_headers(&settings(), &headers("upstream-42"));
        assert_eq!(ctx.request_id().as_str(), "upstream-42");
        assert_eq!(ctx.origin(), IdOrigin::Propagated);
    }

    #[test]
    fn test_generates_without_header() {
        let ctx = RequestContext::from_headers(&settings(), &HeaderMap::new());
        assert_eq!(ctx.origin(), IdOrigin::Generated);
        assert_eq!(ctx.request_id().as_str().len(), 36);
    }

    #[test]
    fn test_replaces_invalid_header() {
        let ctx = RequestContext::from_headers(&settings(), &headers("has spaces in it"));
        assert_eq!(ctx.origin(), IdOrigin::Generated);
        assert_ne!(ctx.request_id().as_str(), "has spaces in it");

        let long = "a".repeat(DEFAULT_MAX_LENGTH + 1);
        let ctx = RequestContext::from_headers(&settings(), &headers(&long));
        assert_eq!(ctx.origin(), IdOrigin::Generated);
    }

    #[test]
    fn test_custom_header_name() {
        let props = TraceProperties {
            request_id_header_name: "X-Correlation-Id".to_string(),
            ..Default::default()
        };
        let settings = TraceSettings::from_properties(&props).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-correlation-id", HeaderValue::from_static("corr-1"));
        let ctx = RequestContext::from_headers(&settings, &headers);
        assert_eq!(ctx.request_id().as_str(), "corr-1");

        let (name, value) = ctx.response_header(&settings).unwrap();
        assert_eq!(name.as_str(), "x-correlation-id");
        assert_eq!(value, "corr-1");
    }

    #[tokio::test]
    async fn test_run_scopes_identifier() {
        let ctx = RequestContext::with_id("req-run");
        let seen = ctx.run(async { context::get() }).await;
        assert_eq!(seen, Some(RequestId::from("req-run")));
        assert_eq!(context::get(), None);
    }

    #[tokio::test]
    async fn test_extractor_reads_header() {
        async fn handler(ctx: RequestContext) -> String {
            ctx.request_id().to_string()
        }

        let app = Router::new().route("/", get(handler)).with_state(settings());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "from-client")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"from-client");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), 36);
    }

    #[tokio::test]
    async fn test_extractor_prefers_extension() {
        let mut parts = Request::builder()
            .uri("/")
            .header("x-request-id", "from-header")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.extensions.insert(RequestContext::with_id("from-host"));

        let ctx = RequestContext::from_request_parts(&mut parts, &settings()).await.unwrap();
        assert_eq!(ctx.request_id().as_str(), "from-host");
    }
}
