//! Decide which requests are not traced

use axum::http::Method;
use regex::Regex;

/// Ignore rules for request tracing.
///
/// A request is skipped when its method is `OPTIONS`, `HEAD` or `TRACE`,
/// or when its path matches one of the ignore patterns in full. Patterns
/// are anchored, so `.*\.css` matches `/site.css` but not `/site.css/x`.
#[derive(Debug, Clone, Default)]
pub struct TraceFilter {
    patterns: Vec<Regex>,
}

impl TraceFilter {
    /// Compile ignore patterns; fails on the first invalid one
    pub fn new<I, S>(patterns: I) -> Result<Self, (String, regex::Error)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(&format!("^(?:{})$", p)).map_err(|e| (p.to_string(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Whether the request should bypass request-id handling
    pub fn should_skip(&self, method: &Method, path: &str) -> bool {
        if matches!(*method, Method::OPTIONS | Method::HEAD | Method::TRACE) {
            return true;
        }
        self.is_ignored_path(path)
    }

    /// Whether the path matches an ignore pattern
    pub fn is_ignored_path(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
