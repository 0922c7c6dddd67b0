//! Exclusion filter
//!
//! Drops non-production objects (temporary, audit, log and test tables or
//! views) by naming convention before any per-object catalog query runs.

/// Substrings excluded when nothing else is configured
pub const DEFAULT_EXCLUDE_PATTERNS: [&str; 4] = ["temp", "audit", "log", "test"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// True if `name` contains any configured pattern, ignoring case
    pub fn should_exclude(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_PATTERNS)
    }
}
