//! Options bound from `forgeboot.i18n`

use forgeboot_core::{ConfigError, Properties};
use serde::{Deserialize, Serialize};

use crate::locale::LocaleTag;

/// Locale options consumed by the host's locale resolver and message source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nProperties {
    /// Locale used when the request does not name one
    pub default_locale: String,

    /// Query parameter carrying the requested locale, e.g. `?lang=en`
    pub lang_request_parameter: String,

    /// Search pattern for message bundles, without the file suffix
    pub wild_path_for_language_files: String,

    /// File suffix of message bundles
    pub location_pattern_suffix: String,
}

impl Default for I18nProperties {
    fn default() -> Self {
        Self {
            default_locale: "zh_CN".to_string(),
            lang_request_parameter: "lang".to_string(),
            wild_path_for_language_files: "classpath*:i18n/**/messages".to_string(),
            location_pattern_suffix: ".properties".to_string(),
        }
    }
}

impl I18nProperties {
    /// The default locale, parsed
    pub fn default_locale_tag(&self) -> Result<LocaleTag, ConfigError> {
        LocaleTag::parse(&self.default_locale)
            .map_err(|e| ConfigError::invalid(Self::field("default_locale"), e.to_string()))
    }

    /// Pattern matching every bundle file, e.g. `classpath*:i18n/**/messages*.properties`
    pub fn bundle_location_pattern(&self) -> String {
        format!(
            "{}*{}",
            self.wild_path_for_language_files, self.location_pattern_suffix
        )
    }

    /// Bundle base name of a resource path: everything before the last
    /// occurrence of the suffix. Paths without the suffix are returned as-is.
    pub fn base_name<'a>(&self, resource_path: &'a str) -> &'a str {
        match resource_path.rfind(self.location_pattern_suffix.as_str()) {
            Some(idx) if !self.location_pattern_suffix.is_empty() => &resource_path[..idx],
            _ => resource_path,
        }
    }

    /// Distinct base names of the given resource paths, in first-seen order
    pub fn base_names<'a, I>(&self, resource_paths: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&'a str> = Vec::new();
        for path in resource_paths {
            let name = self.base_name(path);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl Properties for I18nProperties {
    const PREFIX: &'static str = "forgeboot.i18n";

    fn validate(&self) -> forgeboot_core::Result<()> {
        self.default_locale_tag()?;

        let param = self.lang_request_parameter.trim();
        if param.is_empty() || param.contains(['&', '=', '?', ' ']) {
            return Err(ConfigError::invalid(
                Self::field("lang_request_parameter"),
                "must be a non-empty query parameter name",
            ));
        }

        if self.wild_path_for_language_files.trim().is_empty() {
            return Err(ConfigError::invalid(
                Self::field("wild_path_for_language_files"),
                "must not be empty",
            ));
        }

        if !self.location_pattern_suffix.starts_with('.') || self.location_pattern_suffix.len() < 2 {
            return Err(ConfigError::invalid(
                Self::field("location_pattern_suffix"),
                "must be a file extension such as '.properties'",
            ));
        }

        Ok(())
    }
}
