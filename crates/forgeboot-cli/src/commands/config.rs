//! `config show` and `config check`

use anyhow::Context;
use clap::ValueEnum;
use serde_json::json;

use crate::{GroupError, Settings};

/// Rendering of `config show`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

/// Render the effective settings
pub fn show(settings: &Settings, format: OutputFormat) -> anyhow::Result<String> {
    let doc = settings
        .to_document()
        .context("failed to serialize settings")?;
    let value = doc.as_value();

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
    };
    Ok(rendered)
}

/// Summarise a check run as JSON
pub fn check_report(errors: &[GroupError]) -> serde_json::Value {
    json!({
        "valid": errors.is_empty(),
        "errors": errors
            .iter()
            .map(|e| json!({ "prefix": e.prefix, "message": e.error.to_string() }))
            .collect::<Vec<_>>(),
    })
}
