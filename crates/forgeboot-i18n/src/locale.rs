//! Locale tags as written in configuration

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a locale tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("empty locale tag")]
    Empty,

    #[error("invalid language subtag '{0}' (expected 2-3 letters)")]
    InvalidLanguage(String),

    #[error("invalid region subtag '{0}' (expected 2 letters or 3 digits)")]
    InvalidRegion(String),

    #[error("unexpected subtag '{0}'")]
    Unexpected(String),
}

/// A language with an optional region, e.g. `zh_CN`, `en-US` or `fr`.
///
/// Both `_` and `-` separators are accepted. Subtags are normalised to
/// lowercase language and uppercase region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag {
    language: String,
    region: Option<String>,
}

impl LocaleTag {
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LocaleError::Empty);
        }

        let mut parts = tag.split(['_', '-']);
        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LocaleError::InvalidLanguage(language.to_string()));
        }

        let region = match parts.next() {
            None => None,
            Some(r) if r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(r.to_ascii_uppercase())
            }
            Some(r) if r.len() == 3 && r.chars().all(|c| c.is_ascii_digit()) => Some(r.to_string()),
            Some(r) => return Err(LocaleError::InvalidRegion(r.to_string())),
        };

        if let Some(extra) = parts.next() {
            return Err(LocaleError::Unexpected(extra.to_string()));
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// BCP 47 form, e.g. `zh-CN`
    pub fn to_language_tag(&self) -> String {
        self.join('-')
    }

    /// POSIX form used by resource bundle names, e.g. `zh_CN`
    pub fn to_posix(&self) -> String {
        self.join('_')
    }

    fn join(&self, sep: char) -> String {
        match &self.region {
            Some(region) => format!("{}{}{}", self.language, sep, region),
            None => self.language.clone(),
        }
    }
}

impl FromStr for LocaleTag {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_language_tag())
    }
}
