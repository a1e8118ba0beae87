use thiserror::Error;

/// Errors raised at the tool boundary, before or after the engine runs.
///
/// Engine failures (bad path, bad pattern) are not `ToolError`s: they are
/// rendered into a `{"status": "error"}` payload by the tool itself.
#[derive(Error, Debug)]
pub enum ToolError {
    // ============ Input errors ============
    #[error("Invalid input: {0}")]
    InvalidInputError(String),

    #[error("Input parsing failed: {0}")]
    ParsingError(String),

    // ============ Output errors ============
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}
