//! Configuration properties binding for forgeboot.
//!
//! Option groups (tracing, i18n, API versioning, logging) are plain structs
//! implementing [`Properties`]. At startup a [`ConfigLoader`] merges
//! configuration files and environment overrides into a [`ConfigDocument`];
//! each group is then bound once and read many times.
//!
//! # Example
//!
//! ```rust,ignore
//! use forgeboot_core::ConfigLoader;
//! use forgeboot_trace::TraceProperties;
//!
//! let doc = ConfigLoader::new()
//!     .with_optional_file("forgeboot.toml")
//!     .with_env_prefix("FORGEBOOT")
//!     .load()?;
//! let trace: TraceProperties = doc.bind()?;
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod properties;

pub use document::ConfigDocument;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, EnvOverrides, FileFormat, DEFAULT_ROOT};
pub use properties::{usize_from_str_or_int, Properties};
