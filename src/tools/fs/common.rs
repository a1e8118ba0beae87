//! Shared path validation, directory enumeration and payload handling for the
//! file system tools.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::{error_info, error_payload, FsToolsError};
use crate::tools::ToolError;

#[derive(Error, Debug)]
pub enum FileSystemToolError {
    #[error("Path {0} is not absolute. Please provide an absolute path.")]
    InvalidPath(String),
    #[error("Path {0} not found. Please provide an existing path.")]
    PathNotFound(String),
    #[error("Path {0} is not a directory. Please provide a directory path.")]
    NotADirectory(String),
    #[error("Invalid regular expression '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Permission denied accessing {0}.")]
    PermissionDenied(String),
    #[error("File {0} is excluded by the ignore or file patterns.")]
    FilteredOut(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl FileSystemToolError {
    /// Map a failure to enumerate `path` onto the error taxonomy.
    pub fn from_read_dir(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.display().to_string()),
            io::ErrorKind::NotFound => Self::PathNotFound(path.display().to_string()),
            _ => Self::Io {
                path: path.display().to_string(),
                source: err,
            },
        }
    }
}

/// What a validated path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    /// Sockets, FIFOs, devices.
    Other,
}

/// An absolute path that existed when it was checked.
#[derive(Debug, Clone)]
pub struct ValidatedPath {
    pub path: PathBuf,
    pub kind: PathKind,
}

impl ValidatedPath {
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Directory
    }

    /// Fails with `NotADirectory` unless this is a directory.
    pub fn require_dir(self) -> Result<Self, FileSystemToolError> {
        if self.is_dir() {
            Ok(self)
        } else {
            Err(FileSystemToolError::NotADirectory(
                self.path.display().to_string(),
            ))
        }
    }
}

/// Check that `raw` is absolute and exists, and classify it.
///
/// Symlinks are followed; a dangling link counts as not found.
pub fn validate_path(raw: &str) -> Result<ValidatedPath, FileSystemToolError> {
    let path = Path::new(raw);
    if !path.is_absolute() {
        return Err(FileSystemToolError::InvalidPath(raw.to_string()));
    }
    let meta = std::fs::metadata(path).map_err(|err| match err.kind() {
        io::ErrorKind::PermissionDenied => FileSystemToolError::PermissionDenied(raw.to_string()),
        _ => FileSystemToolError::PathNotFound(raw.to_string()),
    })?;
    let kind = if meta.is_dir() {
        PathKind::Directory
    } else if meta.is_file() {
        PathKind::File
    } else {
        PathKind::Other
    };
    Ok(ValidatedPath {
        path: path.to_path_buf(),
        kind,
    })
}

/// One direct child of a directory.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub name: String,
    pub path: PathBuf,
    /// Directory after following symlinks.
    pub is_dir: bool,
    /// Regular file after following symlinks.
    pub is_file: bool,
    pub is_symlink: bool,
}

/// Read the direct children of `dir`, ordered by name.
///
/// Entries that vanish or cannot be stat'd between enumeration and inspection
/// are skipped; only a failure to open the directory itself is an error.
pub fn read_entries(dir: &Path) -> io::Result<Vec<EntryInfo>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::debug!("Skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();
        let is_symlink = entry
            .file_type()
            .map(|t| t.is_symlink())
            .unwrap_or(false);
        let (is_dir, is_file) = match std::fs::metadata(&path) {
            Ok(meta) => (meta.is_dir(), meta.is_file()),
            Err(_) => (false, false),
        };
        entries.push(EntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
            is_file,
            is_symlink,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Directories first, then case-insensitive name order within each group.
pub fn sort_dirs_first(entries: &mut [EntryInfo]) {
    entries.sort_by_cached_key(|e| (!e.is_dir, e.name.to_lowercase()));
}

/// Output form requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Structured `{"status": ...}` JSON payload.
    #[default]
    Json,
    /// Human-readable annotated text.
    Text,
}

pub fn format_from_str(s: &str) -> OutputFormat {
    match s.to_lowercase().as_str() {
        "text" => OutputFormat::Text,
        _ => OutputFormat::Json,
    }
}

/// A successful engine result that can be sent back to the agent.
pub trait ToolPayload: Serialize {
    /// Human-readable rendering of the same data.
    fn render_text(&self) -> String;
}

#[derive(Serialize)]
struct Success<'a, T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

/// Render an engine outcome as the tool's answer.
///
/// Errors become a `{"status": "error"}` payload (or their message in text
/// form); only serialization itself can fail.
pub fn respond<T: ToolPayload>(
    format: OutputFormat,
    outcome: Result<T, FsToolsError>,
) -> Result<String, ToolError> {
    match (format, outcome) {
        (OutputFormat::Json, Ok(body)) => Ok(serde_json::to_string_pretty(&Success {
            status: "success",
            body: &body,
        })?),
        (OutputFormat::Text, Ok(body)) => Ok(body.render_text()),
        (format, Err(err)) => {
            log::debug!("{}", error_info(&err));
            match format {
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&error_payload(&err))?),
                OutputFormat::Text => Ok(err.to_string()),
            }
        }
    }
}

/// Parse tool input that may be a raw JSON string or an object.
pub fn parse_json_input(input: &str) -> Value {
    serde_json::from_str::<Value>(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

/// Decode tool arguments into `T`.
pub fn decode_args<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    match input {
        Value::String(s) => {
            serde_json::from_str(&s).map_err(|e| ToolError::ParsingError(e.to_string()))
        }
        other => serde_json::from_value(other)
            .map_err(|e| ToolError::InvalidInputError(e.to_string())),
    }
}

/// Requested output format, read from the optional `format` argument.
pub fn requested_format(input: &Value) -> OutputFormat {
    let object = match input {
        Value::String(s) => serde_json::from_str::<Value>(s).ok(),
        other => Some(other.clone()),
    };
    object
        .as_ref()
        .and_then(|v| v.get("format"))
        .and_then(Value::as_str)
        .map(format_from_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_rejected() {
        let err = validate_path("relative/path").unwrap_err();
        assert!(matches!(err, FileSystemToolError::InvalidPath(_)));
        assert!(err.to_string().contains("not absolute"));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            validate_path(""),
            Err(FileSystemToolError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_missing_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = validate_path(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, FileSystemToolError::PathNotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_classifies_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let d = validate_path(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(d.kind, PathKind::Directory);
        let f = validate_path(file.to_str().unwrap()).unwrap();
        assert_eq!(f.kind, PathKind::File);
        assert!(matches!(
            f.require_dir(),
            Err(FileSystemToolError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_sort_dirs_first_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("B")).unwrap();

        let mut entries = read_entries(dir.path()).unwrap();
        sort_dirs_first(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(format_from_str("TEXT"), OutputFormat::Text);
        assert_eq!(format_from_str("json"), OutputFormat::Json);
        assert_eq!(format_from_str("anything"), OutputFormat::Json);
        assert_eq!(format_from_str("txt"), OutputFormat::Json);
    }

    #[test]
    fn test_decode_args_from_string_and_object() {
        #[derive(serde::Deserialize)]
        struct Args {
            path: String,
        }
        let a: Args = decode_args(Value::String(r#"{"path": "/tmp"}"#.to_string())).unwrap();
        assert_eq!(a.path, "/tmp");
        let b: Args = decode_args(serde_json::json!({"path": "/var"})).unwrap();
        assert_eq!(b.path, "/var");
        assert!(matches!(
            decode_args::<Args>(Value::String("not json".to_string())),
            Err(ToolError::ParsingError(_))
        ));
        assert!(matches!(
            decode_args::<Args>(serde_json::json!({"other": 1})),
            Err(ToolError::InvalidInputError(_))
        ));
    }

    #[test]
    fn test_requested_format() {
        assert_eq!(
            requested_format(&serde_json::json!({"format": "text"})),
            OutputFormat::Text
        );
        assert_eq!(
            requested_format(&Value::String(r#"{"format":"text"}"#.to_string())),
            OutputFormat::Text
        );
        assert_eq!(requested_format(&serde_json::json!({})), OutputFormat::Json);
    }
}
