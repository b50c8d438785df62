//! Error types for configuration loading and binding

use thiserror::Error;

/// Errors that can occur while loading or binding configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file content is malformed
    #[error("Parse error in {format} source: {message}")]
    Parse { format: &'static str, message: String },

    /// File extension does not map to a known format
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A section could not be deserialized into its properties type
    #[error("Failed to bind '{prefix}': {source}")]
    Bind {
        prefix: String,
        #[source]
        source: serde_json::Error,
    },

    /// A bound value violates a constraint of its properties type
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    /// Create a parse error
    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            format,
            message: message.into(),
        }
    }

    /// Create a validation error for a single option
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the configured values rather than the source
    pub fn is_user_error(&self) -> bool {
        matches!(self, ConfigError::Bind { .. } | ConfigError::Invalid { .. })
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::parse("yaml", err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::parse("toml", err.to_string())
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
