//! API versioning options for forgeboot.
//!
//! Versioned routes are mounted as `<api_prefix>/<version><api_suffix><route>`,
//! so with the defaults a handler for `/users` declared for version `v1` is
//! served at `/api/v1/users`.

use forgeboot_core::{ConfigError, Properties};
use serde::{Deserialize, Serialize};

/// Options bound from `forgeboot.webmvc.version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionProperties {
    /// Path segment placed before the version
    pub api_prefix: String,
    /// Text appended directly after the version
    pub api_suffix: String,
}

impl Default for VersionProperties {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            api_suffix: String::new(),
        }
    }
}

impl VersionProperties {
    /// Compose the mount path of `route` for `version`
    pub fn versioned_path(&self, version: &str, route: &str) -> String {
        let versioned = format!("{}{}", version.trim_matches('/'), self.api_suffix);
        join_segments([self.api_prefix.as_str(), versioned.as_str(), route])
    }

    /// One path per version, in the given order, without duplicates
    pub fn versioned_paths<'a, I>(&self, versions: I, route: &str) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut paths: Vec<String> = Vec::new();
        for version in versions {
            let path = self.versioned_path(version, route);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }
}

impl Properties for VersionProperties {
    const PREFIX: &'static str = "forgeboot.webmvc.version";

    fn validate(&self) -> forgeboot_core::Result<()> {
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(ConfigError::invalid(
                Self::field("api_prefix"),
                "must be empty or start with '/'",
            ));
        }
        if self.api_suffix.contains('/') {
            return Err(ConfigError::invalid(
                Self::field("api_suffix"),
                "must not contain '/'",
            ));
        }
        Ok(())
    }
}

// Joins non-empty segments with a single '/', always rooted.
fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for segment in segments
        .into_iter()
        .flat_map(|s| s.split('/'))
        .filter(|s| !s.is_empty())
    {
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}
