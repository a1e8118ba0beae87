//! Glob filters applied to entry names during listing and traversal.
//!
//! Patterns use shell glob syntax (`*`, `?`, `[...]`) and are matched against
//! the base name of an entry, never its full path.

use glob::Pattern;

/// Always-on deny set: byte-compiled artifacts, VCS metadata, OS metadata,
/// editor swap and config files, temp and log files, package caches.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*.pyc",
    "__pycache__",
    "*.swp",
    ".DS_Store",
    ".git",
    ".svn",
    ".hg",
    "*.tmp",
    "*.temp",
    "*.log",
    ".idea",
    "*.vscode",
    "node_modules",
];

/// Compile a glob, matching it literally when it is malformed.
fn compile(raw: &str) -> Option<Pattern> {
    match Pattern::new(raw) {
        Ok(p) => Some(p),
        Err(err) => {
            log::warn!("Invalid glob pattern '{}' ({}); matching it literally", raw, err);
            Pattern::new(&Pattern::escape(raw)).ok()
        }
    }
}

/// A set of glob patterns with OR semantics.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .filter_map(|p| compile(p.as_ref()))
                .collect(),
        }
    }

    /// True when `name` matches at least one pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// Ignore (deny) set plus optional match (allow) list.
///
/// The ignore side always contains [`DEFAULT_IGNORE_PATTERNS`]; callers can
/// only add to it.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    ignore: PatternSet,
    allow: Option<PatternSet>,
}

impl EntryFilter {
    /// `extra_defaults` are deployment-wide patterns treated like built-ins.
    pub fn new(
        match_patterns: Option<&[String]>,
        ignore: Option<&[String]>,
        extra_defaults: &[String],
    ) -> Self {
        let deny = ignore
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .chain(extra_defaults.iter().map(String::as_str))
            .chain(DEFAULT_IGNORE_PATTERNS.iter().copied());
        // An empty match list means "no match filter".
        let allow = match_patterns
            .filter(|m| !m.is_empty())
            .map(PatternSet::new);
        Self {
            ignore: PatternSet::new(deny),
            allow,
        }
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.matches(name)
    }

    /// True when there is no match list or `name` matches one of its patterns.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.allow.as_ref().map_or(true, |a| a.matches(name))
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.is_allowed(name) && !self.is_ignored(name)
    }
}

/// Check `name` against `patterns` with glob semantics.
pub fn matches(name: &str, patterns: &[String]) -> bool {
    PatternSet::new(patterns).matches(name)
}
