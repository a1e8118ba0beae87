//! grep tool: regex search over file contents with bounded output.
//!
//! Directories are walked top-down with an explicit stack. Ignored
//! directories are pruned before they are pushed, so their contents are never
//! opened. Each file is scanned line by line; only the first match on a line
//! is reported. Files that cannot be read are counted as searched and
//! skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    decode_args, parse_json_input, read_entries, requested_format, respond, validate_path,
    FileSystemToolError, PathKind, ToolPayload,
};
use super::config::{FsToolsConfig, CONTEXT_CHARS};
use super::ignore::{EntryFilter, PatternSet};
use crate::error::FsToolsError;
use crate::tools::{generate_parameters_schema, Tool, ToolError};

fn default_recursive() -> bool {
    true
}

/// Arguments of a grep call.
#[derive(Debug, Clone, Deserialize)]
pub struct GrepRequest {
    /// Regular expression searched on each line.
    pub pattern: String,
    /// Absolute path of a file or directory.
    pub path: String,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Globs restricting which file names are searched.
    #[serde(default)]
    pub file_pattern: Option<Vec<String>>,
    /// Globs for files and directories to skip, on top of the defaults.
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Result cap; the configured default applies when absent.
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl GrepRequest {
    pub fn new(pattern: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            path: path.into(),
            recursive: true,
            file_pattern: None,
            ignore: None,
            case_sensitive: false,
            max_results: None,
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_file_patterns(mut self, patterns: Vec<String>) -> Self {
        self.file_pattern = Some(patterns);
        self
    }

    pub fn with_ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = Some(patterns);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// Text around a match, clipped to the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchContext {
    pub prefix: String,
    #[serde(rename = "match")]
    pub matched: String,
    pub suffix: String,
}

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub file: String,
    /// 1-indexed line number.
    pub line: usize,
    /// The full line, without its line terminator.
    pub content: String,
    /// Character offset of the match start within `content`.
    pub match_start: usize,
    /// Character offset one past the match end.
    pub match_end: usize,
    pub context: MatchContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Files opened for scanning, readable or not.
    pub files_searched: usize,
    pub files_matched: usize,
    pub lines_matched: usize,
    /// The scan stopped early because the result cap was reached.
    pub truncated: bool,
    /// The scan stopped early because the files-searched ceiling was reached.
    pub files_limit_reached: bool,
}

/// Result of a grep call.
#[derive(Debug, Clone, Serialize)]
pub struct GrepOutput {
    pub pattern: String,
    pub path: String,
    pub recursive: bool,
    pub case_sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_pattern: Option<Vec<String>>,
    pub max_results: usize,
    pub matches: Vec<SearchMatch>,
    pub stats: SearchStats,
}

/// Per-file result of a scan attempt.
enum ScanOutcome {
    Completed,
    CapReached,
    Skipped { reason: io::Error },
}

struct Scanner<'a> {
    regex: &'a Regex,
    max_results: usize,
    max_files: usize,
    matches: Vec<SearchMatch>,
    stats: SearchStats,
}

impl<'a> Scanner<'a> {
    fn new(regex: &'a Regex, max_results: usize, max_files: usize) -> Self {
        Self {
            regex,
            max_results,
            max_files,
            matches: Vec::new(),
            stats: SearchStats::default(),
        }
    }

    /// Scan one file. Returns `false` once the whole search must stop.
    fn scan_file(&mut self, path: &Path) -> bool {
        if self.cap_full() {
            self.stats.truncated = true;
            log::info!("Result cap of {} reached; stopping search", self.max_results);
            return false;
        }
        if self.stats.files_searched >= self.max_files {
            log::info!(
                "Files-searched ceiling of {} reached; stopping search",
                self.max_files
            );
            self.stats.files_limit_reached = true;
            return false;
        }
        self.stats.files_searched += 1;
        match self.scan_lines(path) {
            ScanOutcome::Completed => true,
            ScanOutcome::CapReached => {
                log::info!("Result cap of {} reached; stopping search", self.max_results);
                false
            }
            ScanOutcome::Skipped { reason } => {
                log::debug!("Skipping {}: {}", path.display(), reason);
                true
            }
        }
    }

    fn cap_full(&self) -> bool {
        self.matches.len() >= self.max_results
    }

    fn scan_lines(&mut self, path: &Path) -> ScanOutcome {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(reason) => return ScanOutcome::Skipped { reason },
        };
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_number = 0;
        let mut file_matched = false;
        loop {
            match read_line(&mut reader, &mut buf) {
                Ok(false) => return ScanOutcome::Completed,
                Ok(true) => {}
                Err(reason) => return ScanOutcome::Skipped { reason },
            }
            // Input remains past a full cap.
            if self.cap_full() {
                self.stats.truncated = true;
                return ScanOutcome::CapReached;
            }
            line_number += 1;
            let line = decode_line(&buf);
            let range = match self.regex.find(&line) {
                Some(m) => m.range(),
                None => continue,
            };
            if !file_matched {
                file_matched = true;
                self.stats.files_matched += 1;
            }
            self.stats.lines_matched += 1;
            self.matches.push(build_match(path, line_number, line, range));
        }
    }

    fn walk(
        &mut self,
        root: &Path,
        filter: &EntryFilter,
        file_patterns: Option<&PatternSet>,
        recursive: bool,
    ) -> Result<(), FileSystemToolError> {
        let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = match read_entries(&dir) {
                Ok(entries) => entries,
                Err(err) if dir == root => return Err(FileSystemToolError::from_read_dir(root, err)),
                Err(err) => {
                    log::debug!("Skipping unreadable directory {}: {}", dir.display(), err);
                    continue;
                }
            };
            let mut subdirs = Vec::new();
            for entry in entries {
                if filter.is_ignored(&entry.name) {
                    continue;
                }
                if entry.is_dir {
                    // Symlinked directories are not followed.
                    if recursive && !entry.is_symlink {
                        subdirs.push(entry.path);
                    }
                } else if entry.is_file && file_patterns.map_or(true, |p| p.matches(&entry.name)) {
                    if !self.scan_file(&entry.path) {
                        return Ok(());
                    }
                }
            }
            pending.extend(subdirs.into_iter().rev());
        }
        Ok(())
    }
}

/// Read the next line into `buf`, without its terminator.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. Returns `false` at end of input.
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    let mut read_any = false;
    loop {
        let (terminator, used) = {
            let available = match reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if available.is_empty() {
                return Ok(read_any);
            }
            read_any = true;
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    buf.extend_from_slice(&available[..i]);
                    (Some(available[i]), i + 1)
                }
                None => {
                    buf.extend_from_slice(available);
                    (None, available.len())
                }
            }
        };
        reader.consume(used);
        match terminator {
            None => {}
            Some(b'\r') => {
                if reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(true);
            }
            Some(_) => return Ok(true),
        }
    }
}

/// Drop invalid UTF-8 sequences.
fn decode_line(bytes: &[u8]) -> String {
    let mut line = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        line.push_str(chunk.valid());
    }
    line
}

/// Byte index of the start of the `n`-th character before `at`, clipped to 0.
fn back_chars(line: &str, at: usize, n: usize) -> usize {
    line[..at]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(at, |(i, _)| i)
}

/// Byte index just past `n` characters after `at`, clipped to the line end.
fn forward_chars(line: &str, at: usize, n: usize) -> usize {
    line[at..]
        .char_indices()
        .nth(n)
        .map_or(line.len(), |(i, _)| at + i)
}

fn build_match(path: &Path, line_number: usize, line: String, range: Range<usize>) -> SearchMatch {
    let match_start = line[..range.start].chars().count();
    let match_end = match_start + line[range.clone()].chars().count();
    let prefix_from = back_chars(&line, range.start, CONTEXT_CHARS);
    let suffix_to = forward_chars(&line, range.end, CONTEXT_CHARS);
    let context = MatchContext {
        prefix: line[prefix_from..range.start].to_string(),
        matched: line[range.clone()].to_string(),
        suffix: line[range.end..suffix_to].to_string(),
    };
    SearchMatch {
        file: path.display().to_string(),
        line: line_number,
        content: line,
        match_start,
        match_end,
        context,
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run a grep call.
pub fn search(
    request: &GrepRequest,
    config: &FsToolsConfig,
) -> Result<GrepOutput, FileSystemToolError> {
    let root = validate_path(&request.path)?;
    let regex = RegexBuilder::new(&request.pattern)
        .case_insensitive(!request.case_sensitive)
        .build()
        .map_err(|e| FileSystemToolError::InvalidPattern {
            pattern: request.pattern.clone(),
            reason: e.to_string(),
        })?;

    let filter = EntryFilter::new(
        None,
        request.ignore.as_deref(),
        &config.extra_ignore_patterns,
    );
    let file_patterns = request
        .file_pattern
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(PatternSet::new);
    let max_results = request.max_results.unwrap_or(config.default_max_results);
    let mut scanner = Scanner::new(&regex, max_results, config.max_files_searched);

    if root.kind == PathKind::Directory {
        scanner.walk(
            &root.path,
            &filter,
            file_patterns.as_ref(),
            request.recursive,
        )?;
    } else {
        let name = entry_name(&root.path);
        let wanted = root.kind == PathKind::File
            && !filter.is_ignored(&name)
            && file_patterns.as_ref().map_or(true, |p| p.matches(&name));
        if !wanted {
            return Err(FileSystemToolError::FilteredOut(request.path.clone()));
        }
        scanner.scan_file(&root.path);
    }

    Ok(GrepOutput {
        pattern: request.pattern.clone(),
        path: request.path.clone(),
        recursive: request.recursive,
        case_sensitive: request.case_sensitive,
        file_pattern: request.file_pattern.clone(),
        max_results,
        matches: scanner.matches,
        stats: scanner.stats,
    })
}

/// Byte index of the `n`-th character of `s`.
fn char_to_byte(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

const RULE_WIDTH: usize = 80;

impl ToolPayload for GrepOutput {
    fn render_text(&self) -> String {
        let mut lines = vec![
            format!("Search results: '{}' in '{}'", self.pattern, self.path),
            format!(
                "Options: recursive={}, case_sensitive={}",
                self.recursive, self.case_sensitive
            ),
        ];
        if let Some(patterns) = self.file_pattern.as_ref().filter(|p| !p.is_empty()) {
            lines.push(format!("File filter: {}", patterns.join(", ")));
        }
        lines.push(format!(
            "\nStats: searched {} files, {} files matched, {} matching lines",
            self.stats.files_searched, self.stats.files_matched, self.stats.lines_matched
        ));
        if self.stats.truncated {
            lines.push(format!(
                "Note: results truncated, showing the first {} matches",
                self.max_results
            ));
        }
        if self.stats.files_limit_reached {
            lines.push(format!(
                "Note: search stopped after {} files",
                self.stats.files_searched
            ));
        }

        if self.matches.is_empty() {
            lines.push("\nNo matches found.".to_string());
        } else {
            lines.push("\nMatches:".to_string());
            lines.push("=".repeat(RULE_WIDTH));
            let mut current_file: Option<&str> = None;
            for m in &self.matches {
                if current_file != Some(m.file.as_str()) {
                    current_file = Some(m.file.as_str());
                    lines.push(format!("\nFile: {}", m.file));
                    lines.push("-".repeat(RULE_WIDTH));
                }
                let start = char_to_byte(&m.content, m.match_start);
                let end = char_to_byte(&m.content, m.match_end);
                lines.push(format!(
                    "{:5}: {}[MATCH]{}[/MATCH]{}",
                    m.line,
                    &m.content[..start],
                    &m.content[start..end],
                    &m.content[end..]
                ));
            }
        }
        lines.push(format!("\n{}", "=".repeat(RULE_WIDTH)));
        lines.join("\n")
    }
}

/// Tool that searches file contents with a regular expression.
pub struct GrepTool {
    config: FsToolsConfig,
}

impl GrepTool {
    pub fn new() -> Self {
        Self {
            config: FsToolsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FsToolsConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for GrepTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> String {
        "grep".to_string()
    }

    fn description(&self) -> String {
        "Search for lines matching a regular expression in a file or directory (absolute path). \
         Case-insensitive unless case_sensitive is true. Returns each match with its line number \
         and surrounding context, plus search statistics."
            .to_string()
    }

    fn parameters(&self) -> Value {
        generate_parameters_schema(vec![
            ("pattern", "String", Some("Regular expression to search for"), true),
            ("path", "String", Some("Absolute path of the file or directory to search"), true),
            ("recursive", "bool", Some("Search subdirectories; default true"), false),
            (
                "file_pattern",
                "Vec<String>",
                Some("Glob patterns restricting which files are searched (e.g. *.rs)"),
                false,
            ),
            ("ignore", "Vec<String>", Some("Glob patterns of files and directories to skip"), false),
            ("case_sensitive", "bool", Some("Match case exactly; default false"), false),
            ("max_results", "usize", Some("Maximum number of matches; default 1000"), false),
            ("format", "String", Some("'json' (default) or 'text'"), false),
        ])
    }

    async fn parse_input(&self, input: &str) -> Value {
        parse_json_input(input)
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let format = requested_format(&input);
        let outcome = decode_args::<GrepRequest>(input)
            .map_err(FsToolsError::from)
            .and_then(|request| {
                log::info!("grep '{}' in {}", request.pattern, request.path);
                search(&request, &self.config).map_err(FsToolsError::from)
            });
        respond(format, outcome)
    }
}
