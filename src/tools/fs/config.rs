//! Configuration shared by the file system tools.
//!
//! Built in code (or deserialized by the host) and handed to each tool; the
//! tools never read configuration files themselves.

use serde::{Deserialize, Serialize};

/// Maximum tree expansion depth; requested depths are clamped to `1..=3`.
pub const MAX_TREE_DEPTH: usize = 3;

/// Number of characters of context kept on each side of a grep match.
pub const CONTEXT_CHARS: usize = 10;

/// Limits and deployment-wide filters for grep, ls and tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsToolsConfig {
    /// Result cap used when a grep call does not pass `max_results`.
    pub default_max_results: usize,
    /// Upper bound on files a single grep call may open.
    pub max_files_searched: usize,
    /// Patterns ignored in every call, in addition to the built-in deny set.
    pub extra_ignore_patterns: Vec<String>,
}

impl Default for FsToolsConfig {
    fn default() -> Self {
        Self {
            default_max_results: 1000,
            max_files_searched: 20_000,
            extra_ignore_patterns: Vec::new(),
        }
    }
}

impl FsToolsConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grep result cap applied when the caller omits one.
    pub fn with_default_max_results(mut self, max_results: usize) -> Self {
        self.default_max_results = max_results;
        self
    }

    /// Set the per-call ceiling on files opened by grep.
    pub fn with_max_files_searched(mut self, max_files: usize) -> Self {
        self.max_files_searched = max_files;
        self
    }

    /// Add a pattern to the always-on ignore set.
    pub fn with_ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.extra_ignore_patterns.push(pattern.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FsToolsConfig::new();
        assert_eq!(config.default_max_results, 1000);
        assert_eq!(config.max_files_searched, 20_000);
        assert!(config.extra_ignore_patterns.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = FsToolsConfig::new()
            .with_default_max_results(50)
            .with_max_files_searched(10)
            .with_ignore_pattern("target");
        assert_eq!(config.default_max_results, 50);
        assert_eq!(config.max_files_searched, 10);
        assert_eq!(config.extra_ignore_patterns, vec!["target".to_string()]);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: FsToolsConfig =
            serde_json::from_str(r#"{"max_files_searched": 5}"#).unwrap();
        assert_eq!(config.max_files_searched, 5);
        assert_eq!(config.default_max_results, 1000);
    }
}
