//! Shared pieces of the `forgeboot` command line tool

pub mod commands;

use forgeboot_core::{ConfigDocument, ConfigError, ConfigLoader, Properties};
use forgeboot_i18n::I18nProperties;
use forgeboot_trace::{LoggingProperties, TraceProperties, TraceSettings};
use forgeboot_version::VersionProperties;
use serde::Serialize;
use std::path::Path;

/// Environment prefix used when none is given
pub const DEFAULT_ENV_PREFIX: &str = "FORGEBOOT";

/// Every option group the tool knows about, bound from one document
#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings {
    pub trace: TraceProperties,
    pub i18n: I18nProperties,
    pub version: VersionProperties,
    pub logging: LoggingProperties,
}

/// A group that failed to bind or validate
#[derive(Debug)]
pub struct GroupError {
    pub prefix: &'static str,
    pub error: ConfigError,
}

impl Settings {
    /// Assemble the configuration document from an optional file and the environment
    pub fn load_document(config: Option<&Path>, env_prefix: &str) -> forgeboot_core::Result<ConfigDocument> {
        Self::loader(config, env_prefix).load()
    }

    /// The loader behind [`Settings::load_document`]: `<env_prefix>__TRACE__X`
    /// overrides `forgeboot.trace.x`, and legacy names of every group are
    /// recognised in each source.
    pub fn loader(config: Option<&Path>, env_prefix: &str) -> ConfigLoader {
        let mut loader = ConfigLoader::new();
        if let Some(path) = config {
            loader = loader.with_file(path);
        }
        loader
            .with_env_prefix(env_prefix)
            .with_aliases::<TraceProperties>()
            .with_aliases::<I18nProperties>()
            .with_aliases::<VersionProperties>()
            .with_aliases::<LoggingProperties>()
    }

    /// Bind all groups, stopping at the first failure
    pub fn bind(doc: &ConfigDocument) -> forgeboot_core::Result<Self> {
        Ok(Self {
            trace: doc.bind()?,
            i18n: doc.bind()?,
            version: doc.bind()?,
            logging: doc.bind()?,
        })
    }

    /// Bind all groups and report every failure
    pub fn check(doc: &ConfigDocument) -> Vec<GroupError> {
        [
            check_group::<TraceProperties>(doc),
            check_group::<I18nProperties>(doc),
            check_group::<VersionProperties>(doc),
            check_group::<LoggingProperties>(doc),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn trace_settings(&self) -> forgeboot_core::Result<TraceSettings> {
        TraceSettings::from_properties(&self.trace)
    }

    /// The bound values laid out under their dotted prefixes
    pub fn to_document(&self) -> serde_json::Result<ConfigDocument> {
        let mut doc = ConfigDocument::new();
        doc.set(TraceProperties::PREFIX, serde_json::to_value(&self.trace)?);
        doc.set(I18nProperties::PREFIX, serde_json::to_value(&self.i18n)?);
        doc.set(VersionProperties::PREFIX, serde_json::to_value(&self.version)?);
        doc.set(LoggingProperties::PREFIX, serde_json::to_value(&self.logging)?);
        Ok(doc)
    }
}

fn check_group<T: Properties>(doc: &ConfigDocument) -> Option<GroupError> {
    doc.bind::<T>().err().map(|error| GroupError {
        prefix: T::PREFIX,
        error,
    })
}
