//! Configuration sources: files and environment overrides
//!
//! # Files
//!
//! The format is picked from the extension: `.toml`, `.yaml`/`.yml` or
//! `.json`. Files are applied in the order they were added, later files
//! overriding earlier ones.
//!
//! # Environment
//!
//! Variables are mapped to dotted paths by splitting on `__` and
//! lowercasing. Only variables whose first segment equals the configured
//! prefix are read; the prefix is replaced by the option root (`forgeboot`
//! unless changed with [`EnvOverrides::with_root`]):
//! `APP__TRACE__REQUEST_ID_HEADER_NAME` → `forgeboot.trace.request_id_header_name`.
//!
//! # Legacy option names
//!
//! Groups registered with [`ConfigLoader::with_aliases`] have their legacy
//! names renamed in every source before sources are merged, so a later
//! source overrides an earlier one whichever spelling each uses.
//!
//! Values starting with `[` or `{` are parsed as JSON so lists can be
//! overridden; everything else is kept as a string.

use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::properties::Properties;

/// Root of every option path built from an environment variable
pub const DEFAULT_ROOT: &str = "forgeboot";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Yaml,
}

impl FileFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Ok(FileFormat::Json),
            "toml" => Ok(FileFormat::Toml),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(format!(
                "{} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Parse file content into a JSON tree
    pub fn parse(self, content: &str) -> Result<JsonValue> {
        match self {
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::parse("json", e.to_string()))
            }
            FileFormat::Toml => Ok(toml_to_json(toml::from_str(content)?)),
            FileFormat::Yaml => Ok(yaml_to_json(serde_yaml::from_str(content)?)),
        }
    }
}

/// Naming rules for environment overrides
#[derive(Debug, Clone)]
pub struct EnvOverrides {
    /// First segment a variable must carry to be considered (case-insensitive)
    pub prefix: String,
    /// Separator between path segments (default: "__")
    pub separator: String,
    /// First segment of the produced paths (default: [`DEFAULT_ROOT`])
    pub root: String,
}

impl EnvOverrides {
    /// Overrides for variables starting with `<prefix>__`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "__".to_string(),
            root: DEFAULT_ROOT.to_string(),
        }
    }

    /// Map variables onto `root` instead of [`DEFAULT_ROOT`]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Map a variable name to a dotted path, if it belongs to this prefix
    pub fn path_for(&self, name: &str) -> Option<String> {
        let mut segments = name.split(self.separator.as_str());
        let first = segments.next()?;
        if !first.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }

        let rest: Vec<String> = segments
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();
        if rest.is_empty() {
            return None;
        }

        Some(format!("{}.{}", self.root, rest.join(".")))
    }

    /// Apply matching variables to the document
    pub fn apply<I>(&self, vars: I, doc: &mut ConfigDocument)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, raw) in vars {
            if let Some(path) = self.path_for(&name) {
                tracing::debug!(variable = %name, path = %path, "Applying environment override");
                doc.set(&path, env_value(&raw));
            }
        }
    }
}

fn env_value(raw: &str) -> JsonValue {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    JsonValue::String(raw.to_string())
}

/// Builder that assembles a [`ConfigDocument`] from files and the environment
#[derive(Debug, Default)]
pub struct ConfigLoader {
    files: Vec<(PathBuf, bool)>,
    env: Option<EnvOverrides>,
    aliases: Vec<AliasTable>,
}

#[derive(Debug, Clone, Copy)]
struct AliasTable {
    prefix: &'static str,
    aliases: &'static [(&'static str, &'static str)],
}

impl ConfigLoader {
    /// Create a loader with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required configuration file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push((path.into(), true));
        self
    }

    /// Add a configuration file that is skipped when absent
    pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push((path.into(), false));
        self
    }

    /// Read overrides from environment variables carrying `prefix`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env = Some(EnvOverrides::with_prefix(prefix));
        self
    }

    /// Read overrides with custom naming rules
    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = Some(env);
        self
    }

    /// Rename the legacy option names of `T` in every source
    pub fn with_aliases<T: Properties>(mut self) -> Self {
        if !T::ALIASES.is_empty() {
            self.aliases.push(AliasTable {
                prefix: T::PREFIX,
                aliases: T::ALIASES,
            });
        }
        self
    }

    fn canonicalize(&self, doc: &mut ConfigDocument) {
        for table in &self.aliases {
            doc.rename_keys(table.prefix, table.aliases);
        }
    }

    /// Load all sources from disk and the process environment
    pub fn load(&self) -> Result<ConfigDocument> {
        self.load_with_vars(std::env::vars())
    }

    /// Load all sources, taking environment variables from `vars`
    pub fn load_with_vars<I>(&self, vars: I) -> Result<ConfigDocument>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut doc = ConfigDocument::new();

        for (path, required) in &self.files {
            if !path.exists() && !required {
                tracing::debug!(path = %path.display(), "Optional configuration file not found");
                continue;
            }

            let format = FileFormat::from_path(path)?;
            let content = std::fs::read_to_string(path)?;
            let mut source = ConfigDocument::from_value(format.parse(&content)?);
            self.canonicalize(&mut source);
            doc.merge(source);
            tracing::info!(path = %path.display(), ?format, "Loaded configuration file");
        }

        if let Some(env) = &self.env {
            let mut overrides = ConfigDocument::new();
            env.apply(vars, &mut overrides);
            self.canonicalize(&mut overrides);
            doc.merge(overrides);
        }

        Ok(doc)
    }
}

fn toml_to_json(toml: toml::Value) -> JsonValue {
    match toml {
        toml::Value::String(s) => JsonValue::String(s),
        toml::Value::Integer(i) => JsonValue::Number(serde_json::Number::from(i)),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        toml::Value::Boolean(b) => JsonValue::Bool(b),
        toml::Value::Array(arr) => JsonValue::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => JsonValue::String(dt.to_string()),
    }
}

fn yaml_to_json(yaml: serde_yaml::Value) -> JsonValue {
    match yaml {
        serde_yaml::Value::Null => JsonValue::Null,
        serde_yaml::Value::Bool(b) => JsonValue::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(serde_json::Number::from(i))
            } else if let Some(u) = n.as_u64() {
                JsonValue::Number(serde_json::Number::from(u))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            }
        }
        serde_yaml::Value::String(s) => JsonValue::String(s),
        serde_yaml::Value::Sequence(seq) => {
            JsonValue::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => JsonValue::Object(
            map.into_iter()
                .filter_map(|(k, v)| {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((key, yaml_to_json(v)))
                })
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("a.toml")).unwrap(), FileFormat::Toml);
        assert_eq!(FileFormat::from_path(Path::new("a.YML")).unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("a.json")).unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_path(Path::new("a.ini")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_env_path_mapping() {
        let env = EnvOverrides::with_prefix("FORGEBOOT");
        assert_eq!(
            env.path_for("FORGEBOOT__TRACE__REQUEST_ID_HEADER_NAME").as_deref(),
            Some("forgeboot.trace.request_id_header_name")
        );
        assert_eq!(env.path_for("OTHER__TRACE__X"), None);
        assert_eq!(env.path_for("FORGEBOOT"), None);
        assert_eq!(env.path_for("FORGEBOOTX__A"), None);
    }

    #[test]
    fn test_custom_prefix_targets_default_root() {
        let env = EnvOverrides::with_prefix("APP");
        assert_eq!(
            env.path_for("APP__TRACE__REQUEST_ID_HEADER_NAME").as_deref(),
            Some("forgeboot.trace.request_id_header_name")
        );
        assert_eq!(env.path_for("FORGEBOOT__TRACE__X"), None);

        let rooted = EnvOverrides::with_prefix("APP").with_root("service");
        assert_eq!(rooted.path_for("app__a__b").as_deref(), Some("service.a.b"));
    }

    #[test]
    fn test_custom_prefix_overrides_bind() {
        #[derive(Debug, Default, serde::Deserialize)]
        #[serde(default)]
        struct Trace {
            request_id_header_name: String,
        }

        impl Properties for Trace {
            const PREFIX: &'static str = "forgeboot.trace";
        }

        let doc = ConfigLoader::new()
            .with_env_prefix("APP")
            .load_with_vars(vec![(
                "APP__TRACE__REQUEST_ID_HEADER_NAME".to_string(),
                "X-App-Id".to_string(),
            )])
            .unwrap();
        let bound: Trace = doc.bind().unwrap();
        assert_eq!(bound.request_id_header_name, "X-App-Id");
    }

    #[test]
    fn test_legacy_name_in_file_overridden_by_env() {
        #[derive(Debug, Default, serde::Deserialize)]
        #[serde(default)]
        struct Filter {
            ignore_patterns: Vec<String>,
        }

        impl Properties for Filter {
            const PREFIX: &'static str = "forgeboot.trace";
            const ALIASES: &'static [(&'static str, &'static str)] = &[("ignore_patten", "ignore_patterns")];
        }

        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "app.toml", "[forgeboot.trace]\nignorePatten = [\"/health\"]\n");

        let doc = ConfigLoader::new()
            .with_file(&path)
            .with_env_prefix("FORGEBOOT")
            .with_aliases::<Filter>()
            .load_with_vars(vec![(
                "FORGEBOOT__TRACE__IGNORE_PATTERNS".to_string(),
                r#"["/metrics"]"#.to_string(),
            )])
            .unwrap();

        let bound: Filter = doc.bind().unwrap();
        assert_eq!(bound.ignore_patterns, vec!["/metrics".to_string()]);
    }

    #[test]
    fn test_env_value_parsing() {
        assert_eq!(env_value("X-Request-Id"), serde_json::json!("X-Request-Id"));
        assert_eq!(env_value(r#"["/health", "/metrics"]"#), serde_json::json!(["/health", "/metrics"]));
        assert_eq!(env_value("64"), serde_json::json!("64"));
        assert_eq!(env_value("[not json"), serde_json::json!("[not json"));
    }

    #[test]
    fn test_load_toml_and_yaml_layers() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_file(
            &dir,
            "base.toml",
            "[forgeboot.trace]\nrequest-id-header-name = \"X-Base\"\nrequestIdMdcKey = \"rid\"\n",
        );
        let overlay = write_file(
            &dir,
            "overlay.yaml",
            "forgeboot:\n  trace:\n    request_id_header_name: X-Overlay\n",
        );

        let doc = ConfigLoader::new()
            .with_file(&base)
            .with_file(&overlay)
            .load_with_vars(Vec::new())
            .unwrap();

        assert_eq!(
            doc.section("forgeboot.trace.request_id_header_name"),
            Some(&serde_json::json!("X-Overlay"))
        );
        assert_eq!(
            doc.section("forgeboot.trace.request_id_mdc_key"),
            Some(&serde_json::json!("rid"))
        );
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "app.json", r#"{"forgeboot": {"i18n": {"defaultLocale": "en_US"}}}"#);

        let doc = ConfigLoader::new()
            .with_file(&path)
            .with_env_prefix("FORGEBOOT")
            .load_with_vars(vec![
                ("FORGEBOOT__I18N__DEFAULT_LOCALE".to_string(), "fr_FR".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ])
            .unwrap();

        assert_eq!(
            doc.section("forgeboot.i18n.default_locale"),
            Some(&serde_json::json!("fr_FR"))
        );
        assert!(doc.section("path").is_none());
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let doc = ConfigLoader::new()
            .with_optional_file(&missing)
            .load_with_vars(Vec::new())
            .unwrap();
        assert_eq!(doc, ConfigDocument::new());

        let err = ConfigLoader::new()
            .with_file(&missing)
            .load_with_vars(Vec::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.json", "{ not json");
        let err = ConfigLoader::new().with_file(&path).load_with_vars(Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "json", .. }));
    }
}
