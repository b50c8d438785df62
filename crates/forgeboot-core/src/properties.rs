//! The contract every option group implements

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::Result;

/// A group of named options bound from one configuration section.
///
/// Implementors are plain data holders: `Default` supplies the documented
/// defaults, serde fills whatever the source provides, and [`validate`]
/// rejects values the consumer could not use. Once bound, a properties
/// value is never mutated.
///
/// [`validate`]: Properties::validate
pub trait Properties: DeserializeOwned + Default {
    /// Dotted path of the section, e.g. `forgeboot.trace`
    const PREFIX: &'static str;

    /// Former option names still accepted, as `(legacy, current)` pairs in
    /// `snake_case`. A source that sets both keeps the current name.
    const ALIASES: &'static [(&'static str, &'static str)] = &[];

    /// Check constraints that serde cannot express
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Fully qualified option name, used in error messages
    fn field(name: &str) -> String {
        format!("{}.{}", Self::PREFIX, name)
    }
}

/// Deserialize an unsigned integer given either as a number or a numeric string.
///
/// Environment overrides always arrive as strings, so numeric options use
/// this to accept both `max = 64` in a file and `...__MAX=64` in the
/// environment.
pub fn usize_from_str_or_int<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(usize),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
