//! # sandbox-fs-tools
//!
//! Bounded filesystem introspection for LLM agents. Three read-only tools let an
//! agent inspect a workspace without shell access:
//!
//! - **grep**: regex search over a file or directory tree, with a result cap,
//!   per-match context and search statistics
//! - **ls**: direct children of a directory, directories first
//! - **tree**: directory tree expanded to at most three levels
//!
//! Every tool validates that its path is absolute and exists, applies a
//! built-in ignore set (VCS metadata, caches, logs, editor files) on top of
//! caller patterns, and answers with a `{"status": "success" | "error"}` JSON
//! payload or a human-readable rendering of it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sandbox_fs_tools::tools::{fs_tools, fs::FsToolsConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tools = fs_tools(FsToolsConfig::default());
//! let grep = &tools[0];
//! let out = grep.call(r#"{"pattern": "TODO", "path": "/srv/workspace"}"#).await?;
//! println!("{out}");
//! # Ok(()) }
//! ```
//!
//! The engines are also callable directly and synchronously:
//! [`tools::fs::search`], [`tools::fs::list`] and [`tools::fs::walk`].

/// Unified error types, error codes and error payloads.
pub mod error;
/// Tool trait, tool errors, parameter schemas and the filesystem tools.
pub mod tools;

// ============================================================================
// Type Aliases for Common Type Combinations
// ============================================================================

use std::sync::Arc;

/// Type alias for a tool wrapped in Arc
pub type Tool = Arc<dyn crate::tools::Tool>;

/// Type alias for a list of tools
pub type Tools = Vec<Arc<dyn crate::tools::Tool>>;
