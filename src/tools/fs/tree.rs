//! tree tool: depth-limited directory tree.
//!
//! Expansion depth is clamped to `1..=MAX_TREE_DEPTH`, so recursion here is
//! bounded. A directory that fails the match list is dropped with its whole
//! subtree; a directory that cannot be read becomes a leaf carrying `error`.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    decode_args, parse_json_input, read_entries, requested_format, respond, sort_dirs_first,
    validate_path, FileSystemToolError, ToolPayload,
};
use super::config::{FsToolsConfig, MAX_TREE_DEPTH};
use super::ignore::EntryFilter;
use crate::error::FsToolsError;
use crate::tools::{generate_parameters_schema, Tool, ToolError};

fn default_max_depth() -> i64 {
    MAX_TREE_DEPTH as i64
}

/// Arguments of a tree call.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeRequest {
    /// Absolute directory path.
    pub path: String,
    /// Requested depth; clamped to `1..=3`.
    #[serde(default = "default_max_depth")]
    pub max_depth: i64,
    #[serde(default, rename = "match")]
    pub match_patterns: Option<Vec<String>>,
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

impl TreeRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            max_depth: default_max_depth(),
            match_patterns: None,
            ignore: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: i64) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_match(mut self, patterns: Vec<String>) -> Self {
        self.match_patterns = Some(patterns);
        self
    }

    pub fn with_ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = Some(patterns);
        self
    }

    /// Depth actually used for expansion.
    pub fn effective_depth(&self) -> usize {
        self.max_depth.clamp(1, MAX_TREE_DEPTH as i64) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    /// Present only when the directory was expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    /// Set instead of `children` when the directory could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TreeNode {
    fn leaf(name: String, kind: NodeKind, path: &Path) -> Self {
        Self {
            name,
            kind,
            path: path.display().to_string(),
            children: None,
            error: None,
        }
    }

    fn failed(name: String, path: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::leaf(name, NodeKind::Directory, path)
        }
    }
}

/// Result of a tree call.
#[derive(Debug, Clone, Serialize)]
pub struct TreeOutput {
    pub path: String,
    pub max_depth: usize,
    pub tree: Vec<TreeNode>,
    pub directories: usize,
    pub files: usize,
    pub total: usize,
}

fn describe_read_error(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => err.to_string(),
    }
}

/// Children of `dir` at `depth` (1 for the root's direct children).
fn walk_dir(
    dir: &Path,
    depth: usize,
    max_depth: usize,
    filter: &EntryFilter,
) -> io::Result<Vec<TreeNode>> {
    let mut entries = read_entries(dir)?;
    sort_dirs_first(&mut entries);

    let mut nodes = Vec::new();
    for entry in entries {
        if filter.is_ignored(&entry.name) || !filter.is_allowed(&entry.name) {
            continue;
        }
        if !entry.is_dir {
            nodes.push(TreeNode::leaf(entry.name, NodeKind::File, &entry.path));
            continue;
        }
        nodes.push(dir_node(entry.name, &entry.path, depth, max_depth, filter));
    }
    Ok(nodes)
}

/// Node for a directory at `depth`, expanded while below `max_depth`.
///
/// A directory that cannot be read becomes a leaf carrying the error.
fn dir_node(
    name: String,
    path: &Path,
    depth: usize,
    max_depth: usize,
    filter: &EntryFilter,
) -> TreeNode {
    let mut node = TreeNode::leaf(name, NodeKind::Directory, path);
    if depth < max_depth {
        match walk_dir(path, depth + 1, max_depth, filter) {
            Ok(children) => node.children = Some(children),
            Err(err) => {
                log::debug!("Cannot read directory {}: {}", path.display(), err);
                node.error = Some(describe_read_error(&err));
            }
        }
    }
    node
}

/// Post-order count of (directories, files).
fn count_nodes(nodes: &[TreeNode]) -> (usize, usize) {
    nodes.iter().fold((0, 0), |(dirs, files), node| match node.kind {
        NodeKind::File => (dirs, files + 1),
        NodeKind::Directory => {
            let (d, f) = node.children.as_deref().map_or((0, 0), count_nodes);
            (dirs + 1 + d, files + f)
        }
    })
}

/// Run a tree call.
pub fn walk(request: &TreeRequest, config: &FsToolsConfig) -> Result<TreeOutput, FileSystemToolError> {
    let root = validate_path(&request.path)?.require_dir()?;
    let max_depth = request.effective_depth();
    let filter = EntryFilter::new(
        request.match_patterns.as_deref(),
        request.ignore.as_deref(),
        &config.extra_ignore_patterns,
    );

    let tree = match walk_dir(&root.path, 1, max_depth, &filter) {
        Ok(nodes) => nodes,
        Err(err) => {
            log::debug!("Cannot read tree root {}: {}", root.path.display(), err);
            let name = root
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| request.path.clone());
            vec![TreeNode::failed(name, &root.path, describe_read_error(&err))]
        }
    };
    let (directories, files) = count_nodes(&tree);

    Ok(TreeOutput {
        path: request.path.clone(),
        max_depth,
        tree,
        directories,
        files,
        total: directories + files,
    })
}

fn render_nodes(nodes: &[TreeNode], top_level: bool, prefix: &str, out: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (connector, child_prefix) = if top_level {
            ("", "    ".to_string())
        } else if last {
            ("└── ", format!("{prefix}    "))
        } else {
            ("├── ", format!("{prefix}│   "))
        };
        let marker = match node.kind {
            NodeKind::Directory => "[D] ",
            NodeKind::File => "[F] ",
        };
        let mut line = format!("{prefix}{connector}{marker}{}", node.name);
        if let Some(error) = &node.error {
            line.push_str(&format!("  [ERROR: {error}]"));
        }
        out.push(line);
        if let Some(children) = &node.children {
            render_nodes(children, false, &child_prefix, out);
        }
    }
}

impl ToolPayload for TreeOutput {
    fn render_text(&self) -> String {
        let mut lines = vec![format!(
            "Directory tree: {} (max depth: {})",
            self.path, self.max_depth
        )];
        render_nodes(&self.tree, true, "", &mut lines);
        lines.push(String::new());
        lines.push("Stats:".to_string());
        lines.push(format!("  Directories: {}", self.directories));
        lines.push(format!("  Files: {}", self.files));
        lines.push(format!("  Total: {}", self.total));
        lines.join("\n")
    }
}

/// Tool that shows the directory tree under an absolute path.
pub struct TreeTool {
    config: FsToolsConfig,
}

impl TreeTool {
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

impl Default for TreeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TreeTool {
    fn name(&self) -> String {
        "tree".to_string()
    }

    fn description(&self) -> String {
        "Show the files and directories under an absolute directory path as a tree, \
         up to max_depth levels (default 3, never more than 3)."
            .to_string()
    }

    fn parameters(&self) -> Value {
        generate_parameters_schema(vec![
            ("path", "String", Some("Absolute directory path; relative paths are rejected"), true),
            ("max_depth", "i64", Some("Levels to expand, 1 to 3; default 3"), false),
            (
                "match",
                "Vec<String>",
                Some("Only include entries matching one of these globs; non-matching directories are skipped with their contents"),
                false,
            ),
            ("ignore", "Vec<String>", Some("Skip entries matching these globs"), false),
            ("format", "String", Some("'json' (default) or 'text'"), false),
        ])
    }

    async fn parse_input(&self, input: &str) -> Value {
        parse_json_input(input)
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let format = requested_format(&input);
        let outcome = decode_args::<TreeRequest>(input)
            .map_err(FsToolsError::from)
            .and_then(|request| {
                log::info!("tree {} (max_depth {})", request.path, request.max_depth);
                walk(&request, &self.config).map_err(FsToolsError::from)
            });
        respond(format, outcome)
    }
}
