//! Unified error handling.
//!
//! Every failure a tool can report is either a [`FileSystemToolError`] raised by
//! one of the engines or a [`ToolError`] raised while decoding arguments or
//! encoding the result. [`FsToolsError`] joins the two so the tool boundary has
//! a single type to render.

pub use crate::tools::fs::FileSystemToolError;
pub use crate::tools::ToolError;

mod utils;
pub use utils::*;

/// Top-level error combining engine and tool-boundary errors.
#[derive(thiserror::Error, Debug)]
pub enum FsToolsError {
    #[error(transparent)]
    FileSystem(#[from] FileSystemToolError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}
