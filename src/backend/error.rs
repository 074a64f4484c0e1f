//! Script parsing errors.

/// Errors for a single malformed script line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: expected 4 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid frame number '{value}'")]
    InvalidFrame { line: usize, value: String },

    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: invalid stick value '{value}'")]
    InvalidStick { line: usize, value: String },

    #[error("line {line}: frame {frame} is not after frame {previous}")]
    OutOfOrder {
        line: usize,
        frame: u32,
        previous: u32,
    },
}
