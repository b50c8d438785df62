//! Request identifier tracing for forgeboot.
//!
//! Every inbound request carries one identifier that correlates all log
//! output produced while handling it. This crate provides:
//!
//! - [`context`]: the per-execution-context slot with `generate`, `get`,
//!   `set` and `clear`, backed by task-local scopes (and a guarded
//!   thread-local fallback) so values cannot leak between requests.
//! - [`RequestContext`]: the explicit request object built from inbound
//!   headers, usable as an Axum extractor.
//! - [`TraceProperties`] / [`TraceSettings`]: the `forgeboot.trace` options
//!   and their validated form, including the [`TraceFilter`] ignore rules.
//! - [`propagate`]: carry the identifier into spawned tasks and blocking jobs.
//! - [`outbound`]: forward the identifier on outgoing client requests.
//! - [`logging`]: log formatting that tags every event with the identifier.
//!
//! # Usage
//!
//! ```rust,ignore
//! use forgeboot_trace::{context, RequestContext, TraceSettings};
//!
//! async fn handle(settings: &TraceSettings, headers: &http::HeaderMap) {
//!     let ctx = RequestContext::from_headers(settings, headers);
//!     ctx.run(async {
//!         tracing::info!(request_id = ?context::get(), "handling");
//!     })
//!     .await;
//! }
//! ```

pub mod context;
pub mod error;
pub mod filter;
pub mod logging;
pub mod outbound;
pub mod properties;
pub mod propagate;
pub mod request_context;
pub mod request_id;
pub mod slot;

pub use error::{Result, TraceError};
pub use filter::TraceFilter;
pub use logging::{LogFormat, LoggingProperties, RequestIdFormat};
pub use outbound::{inject, ContextProvider, RequestIdProvider};
pub use properties::{TraceProperties, TraceSettings};
pub use request_context::{IdOrigin, RequestContext};
pub use request_id::RequestId;
pub use slot::RequestIdSlot;
