//! Core pathstore types: path keys, document walking and errors.
//!
//! - `Path`: a parsed, non-empty path key (`"a.b[0]"`)
//! - `value`: read, write and remove values inside a JSON document by path
//! - `Error`: the error type every store operation returns
//!
//! # Example
//!
//! ```rust
//! use pathstore_core::{path, value, Document};
//! use serde_json::json;
//!
//! let mut doc = Document::new();
//! value::set_path(&mut doc, &path!("users.alice.age"), json!(30)).unwrap();
//! assert_eq!(value::get_path(&doc, &path!("users.alice.age")), Some(&json!(30)));
//! ```

mod error;
mod path;
pub mod value;

pub use error::{Error, Result};
pub use path::{Path, PathError};
pub use value::{Document, TypeTag};
