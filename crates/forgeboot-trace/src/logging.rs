//! Log output tagged with the current request identifier
//!
//! [`RequestIdFormat`] wraps any `tracing-subscriber` event formatter and
//! adds the identifier of the emitting context under the configured key
//! (`request_id_mdc_key`). Text lines get a `key=value ` prefix; JSON lines
//! get an extra top-level field.

use forgeboot_core::{ConfigError, Properties};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::context;
use crate::error::{Result, TraceError};
use crate::properties::TraceSettings;

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Options bound from `forgeboot.logging`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingProperties {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingProperties {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Properties for LoggingProperties {
    const PREFIX: &'static str = "forgeboot.logging";

    fn validate(&self) -> forgeboot_core::Result<()> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid(Self::field("level"), e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Json,
}

/// Event formatter that adds the current request identifier to each event
#[derive(Debug, Clone)]
pub struct RequestIdFormat<F> {
    key: String,
    mode: Mode,
    inner: F,
}

impl<F> RequestIdFormat<F> {
    /// Prefix text lines produced by `inner` with `key=<id> `
    pub fn text(key: impl Into<String>, inner: F) -> Self {
        Self {
            key: key.into(),
            mode: Mode::Text,
            inner,
        }
    }

    /// Add `"key": "<id>"` to JSON objects produced by `inner`
    pub fn json(key: impl Into<String>, inner: F) -> Self {
        Self {
            key: key.into(),
            mode: Mode::Json,
            inner,
        }
    }
}

impl<S, N, F> FormatEvent<S, N> for RequestIdFormat<F>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    F: FormatEvent<S, N>,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let Some(id) = context::get() else {
            return self.inner.format_event(ctx, writer, event);
        };

        match self.mode {
            Mode::Text => {
                write!(writer, "{}={} ", self.key, id)?;
                self.inner.format_event(ctx, writer, event)
            }
            Mode::Json => {
                let mut line = String::new();
                self.inner.format_event(ctx, Writer::new(&mut line), event)?;

                match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(line.trim_end()) {
                    Ok(mut object) => {
                        object.insert(self.key.clone(), serde_json::Value::String(id.into_inner()));
                        let rendered = serde_json::to_string(&object).map_err(|_| fmt::Error)?;
                        writeln!(writer, "{}", rendered)
                    }
                    // inner formatter did not produce a JSON object; pass it through
                    Err(_) => writer.write_str(&line),
                }
            }
        }
    }
}

// Multi-line human readable output used for `LogFormat::Pretty`
fn pretty_format() -> tracing_subscriber::fmt::format::Format<tracing_subscriber::fmt::format::Pretty> {
    tracing_subscriber::fmt::format().pretty().with_target(false)
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a
/// global subscriber is already set.
pub fn init(props: &LoggingProperties, settings: &TraceSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&props.level))
        .map_err(|e| TraceError::Logging(e.to_string()))?;
    let key = settings.mdc_key().to_string();

    let installed = match props.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .event_format(RequestIdFormat::text(key, pretty_format())),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .event_format(RequestIdFormat::json(key, tracing_subscriber::fmt::format().json())),
            )
            .try_init(),
    };

    installed.map_err(|e| TraceError::Logging(e.to_string()))
}
