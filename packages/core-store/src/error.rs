//! Error types shared by every store operation.

use std::path::PathBuf;

use crate::path::PathError;

/// Errors raised by store operations.
///
/// Validation variants are returned before the document is touched, so an
/// error from them leaves both memory and disk unchanged. `Io` and
/// `Serialize` can surface after the in-memory document was already mutated.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The key is empty or could not be parsed into a path.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] PathError),

    /// The value is not storable by this operation.
    #[error("invalid value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The amount given to an arithmetic operation is not a usable integer.
    #[error("invalid amount for key '{key}': {message}")]
    InvalidAmount { key: String, message: String },

    /// Arithmetic was requested on a value that is not a number.
    #[error("value at key '{key}' is not a number")]
    NotANumber { key: String },

    /// An array operation was requested on a value that is not an array.
    #[error("value at key '{key}' is not an array")]
    NotAnArray { key: String },

    /// The operation requires a value at the key and there is none.
    #[error("key '{key}' was not found")]
    KeyNotFound { key: String },

    /// The backup target name is empty.
    #[error("invalid file name: {name:?}")]
    InvalidFileName { name: String },

    /// The backing file does not hold a JSON object.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be converted to JSON.
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A stored value does not have the shape the caller asked for.
    #[error("failed to deserialize value at key '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the store crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;
