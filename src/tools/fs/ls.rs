//! ls tool: list the direct children of a directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    decode_args, parse_json_input, read_entries, requested_format, respond, sort_dirs_first,
    validate_path, FileSystemToolError, ToolPayload,
};
use super::config::FsToolsConfig;
use super::ignore::EntryFilter;
use crate::error::FsToolsError;
use crate::tools::{generate_parameters_schema, Tool, ToolError};

/// Arguments of an ls call.
#[derive(Debug, Clone, Deserialize)]
pub struct LsRequest {
    /// Absolute directory path.
    pub path: String,
    /// Globs an entry must match (any of) to be listed.
    #[serde(default, rename = "match")]
    pub match_patterns: Option<Vec<String>>,
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

impl LsRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            match_patterns: None,
            ignore: None,
        }
    }

    pub fn with_match(mut self, patterns: Vec<String>) -> Self {
        self.match_patterns = Some(patterns);
        self
    }

    pub fn with_ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = Some(patterns);
        self
    }
}

/// Result of an ls call. Directory names carry a trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingOutput {
    pub path: String,
    pub items: Vec<String>,
    pub count: usize,
}

/// Run an ls call.
pub fn list(request: &LsRequest, config: &FsToolsConfig) -> Result<ListingOutput, FileSystemToolError> {
    let dir = validate_path(&request.path)?.require_dir()?;
    let mut entries =
        read_entries(&dir.path).map_err(|err| FileSystemToolError::from_read_dir(&dir.path, err))?;
    sort_dirs_first(&mut entries);

    let filter = EntryFilter::new(
        request.match_patterns.as_deref(),
        request.ignore.as_deref(),
        &config.extra_ignore_patterns,
    );
    let items: Vec<String> = entries
        .into_iter()
        .filter(|e| filter.accepts(&e.name))
        .map(|e| if e.is_dir { format!("{}/", e.name) } else { e.name })
        .collect();

    Ok(ListingOutput {
        path: request.path.clone(),
        count: items.len(),
        items,
    })
}

impl ToolPayload for ListingOutput {
    fn render_text(&self) -> String {
        if self.items.is_empty() {
            return format!("No items found in {}.", self.path);
        }
        format!(
            "Results in {}:\n```\n{}\n```\nFound {} items.",
            self.path,
            self.items.join("\n"),
            self.count
        )
    }
}

/// Tool that lists files and directories at an absolute path.
pub struct LsTool {
    config: FsToolsConfig,
}

impl LsTool {
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

impl Default for LsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LsTool {
    fn name(&self) -> String {
        "ls".to_string()
    }

    fn description(&self) -> String {
        "List files and directories directly inside an absolute directory path. \
         Directories come first and end with '/'. Optionally filter with match and ignore globs."
            .to_string()
    }

    fn parameters(&self) -> Value {
        generate_parameters_schema(vec![
            ("path", "String", Some("Absolute directory path; relative paths are rejected"), true),
            ("match", "Vec<String>", Some("Only list entries matching one of these globs"), false),
            ("ignore", "Vec<String>", Some("Skip entries matching these globs"), false),
            ("format", "String", Some("'json' (default) or 'text'"), false),
        ])
    }

    async fn parse_input(&self, input: &str) -> Value {
        parse_json_input(input)
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let format = requested_format(&input);
        let outcome = decode_args::<LsRequest>(input)
            .map_err(FsToolsError::from)
            .and_then(|request| {
                log::info!("ls {}", request.path);
                list(&request, &self.config).map_err(FsToolsError::from)
            });
        respond(format, outcome)
    }
}
