//! A JSON document persisted to a single file, addressed by path keys.
//!
//! Every mutation rewrites the whole file before returning; reads are served
//! from memory.

pub mod config;
pub mod json_utils;
pub mod local_disk;

pub use pathstore_core::{path, Document, Error, Path, PathError, Result, TypeTag};

pub use config::{StoreConfig, WriteMode, DEFAULT_FILE_NAME};
pub use local_disk::JsonFileStore;
