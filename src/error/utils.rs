//! Error codes and error payloads.
//!
//! Gives each failure a stable numeric code so agents can branch on the kind of
//! error without parsing the message.

use std::fmt;

use serde_json::{json, Value};

use super::{FileSystemToolError, FsToolsError, ToolError};

/// Error code system
///
/// Codes are grouped by origin so they can be tracked and classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Path and filesystem errors (1000-1999)
    InvalidPath = 1001,
    PathNotFound = 1002,
    NotADirectory = 1003,
    PermissionDenied = 1004,
    FilteredOut = 1005,
    IOError = 1006,

    /// Pattern errors (2000-2999)
    InvalidPattern = 2001,

    /// Tool boundary errors (8000-8999)
    ToolInputError = 8001,
    ToolSerializationError = 8002,
}

impl ErrorCode {
    /// Error code for an [`FsToolsError`].
    pub fn from_error(error: &FsToolsError) -> Self {
        match error {
            FsToolsError::FileSystem(e) => Self::from_fs_error(e),
            FsToolsError::Tool(e) => Self::from_tool_error(e),
        }
    }

    pub fn from_fs_error(error: &FileSystemToolError) -> Self {
        match error {
            FileSystemToolError::InvalidPath(_) => ErrorCode::InvalidPath,
            FileSystemToolError::PathNotFound(_) => ErrorCode::PathNotFound,
            FileSystemToolError::NotADirectory(_) => ErrorCode::NotADirectory,
            FileSystemToolError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            FileSystemToolError::FilteredOut(_) => ErrorCode::FilteredOut,
            FileSystemToolError::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            FileSystemToolError::Io { .. } => ErrorCode::IOError,
        }
    }

    pub fn from_tool_error(error: &ToolError) -> Self {
        match error {
            ToolError::InvalidInputError(_) | ToolError::ParsingError(_) => {
                ErrorCode::ToolInputError
            }
            ToolError::SerializationError(_) => ErrorCode::ToolSerializationError,
        }
    }

    /// Numeric value of the code.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::InvalidPath => "Path is not absolute",
            ErrorCode::PathNotFound => "Path does not exist",
            ErrorCode::NotADirectory => "Path is not a directory",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::FilteredOut => "Path excluded by filters",
            ErrorCode::IOError => "IO operation failed",
            ErrorCode::InvalidPattern => "Invalid regular expression",
            ErrorCode::ToolInputError => "Invalid tool input",
            ErrorCode::ToolSerializationError => "Tool output serialization failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}: {}", self.as_u32(), self.description())
    }
}

/// Full error information: code and message on one line.
pub fn error_info(error: &FsToolsError) -> String {
    format!("[{}] {}", ErrorCode::from_error(error), error)
}

/// The `{"status": "error"}` payload returned to the agent.
pub fn error_payload(error: &FsToolsError) -> Value {
    json!({
        "status": "error",
        "message": error.to_string(),
        "code": ErrorCode::from_error(error).as_u32(),
    })
}
