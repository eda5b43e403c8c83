//! Store configuration.
//!
//! `StoreConfig` derives serde so a host application can embed it in its own
//! configuration file:
//!
//! ```toml
//! [store]
//! path = "data/app.json"
//! # "atomic" (default): write a temp file next to the target, then rename
//! # "overwrite": truncate and rewrite the target in place
//! write_mode = "atomic"
//! ```

use std::path;

use serde::{Deserialize, Serialize};

/// File used when no path is configured.
pub const DEFAULT_FILE_NAME: &str = "database.json";

/// How the document is written to disk on every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write to a temporary file in the same directory and rename it over
    /// the target, so readers never observe a half-written file.
    #[default]
    Atomic,
    /// Truncate the target and write it in place.
    Overwrite,
}

/// Configuration for a [`JsonFileStore`](crate::JsonFileStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backing file. Relative paths resolve against the working directory.
    #[serde(default = "default_path")]
    pub path: path::PathBuf,
    #[serde(default)]
    pub write_mode: WriteMode,
}

fn default_path() -> path::PathBuf {
    path::PathBuf::from(DEFAULT_FILE_NAME)
}

impl StoreConfig {
    pub fn new(path: impl Into<path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_mode: WriteMode::default(),
        }
    }

    #[must_use]
    pub fn write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(default_path())
    }
}
