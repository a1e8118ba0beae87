//! File system introspection tools for agents: grep, ls and tree.
//!
//! All three take absolute paths, never modify the filesystem, and always
//! answer with a `{"status": "success" | "error"}` payload.

use std::sync::Arc;

use crate::Tools;

pub mod common;
pub use common::{
    validate_path, FileSystemToolError, OutputFormat, PathKind, ToolPayload, ValidatedPath,
};

pub mod config;
pub use config::{FsToolsConfig, CONTEXT_CHARS, MAX_TREE_DEPTH};

pub mod ignore;
pub use ignore::{EntryFilter, PatternSet, DEFAULT_IGNORE_PATTERNS};

pub mod grep;
pub mod ls;
pub mod tree;

pub use grep::{search, GrepOutput, GrepRequest, GrepTool, MatchContext, SearchMatch, SearchStats};
pub use ls::{list, ListingOutput, LsRequest, LsTool};
pub use tree::{walk, NodeKind, TreeNode, TreeOutput, TreeRequest, TreeTool};

/// The grep, ls and tree tools sharing one configuration.
pub fn fs_tools(config: FsToolsConfig) -> Tools {
    vec![
        Arc::new(GrepTool::new().with_config(config.clone())),
        Arc::new(LsTool::new().with_config(config.clone())),
        Arc::new(TreeTool::new().with_config(config)),
    ]
}
