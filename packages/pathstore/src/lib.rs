//! pathstore: a JSON document on disk, read and mutated through path keys.
//!
//! A store owns one JSON object mirrored to one file. Keys like
//! `"users.alice.tags[0]"` address values inside it; every mutation rewrites
//! the whole file before returning, and reads never touch the disk.
//!
//! # Example
//!
//! ```rust
//! use pathstore::{JsonFileStore, TypeTag};
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = JsonFileStore::open(dir.path().join("database.json")).unwrap();
//!
//! store.set("settings.theme", "dark").unwrap();
//! store.push("settings.recent", "notes.txt").unwrap();
//! store.add("stats.opens", 1).unwrap();
//!
//! assert_eq!(store.get("settings.theme").unwrap(), Some(&json!("dark")));
//! assert_eq!(store.type_of("settings.recent").unwrap(), TypeTag::Array);
//! ```
//!
//! The store installs no logger; it reports through the `log` facade and the
//! host application decides where that goes.

pub use pathstore_core::{path, value, Document, Error, Path, PathError, Result, TypeTag};
pub use pathstore_json_store::{JsonFileStore, StoreConfig, WriteMode, DEFAULT_FILE_NAME};
