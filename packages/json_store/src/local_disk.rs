use std::{ffi, path};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value as JsonValue};

use pathstore_core::{value, Document, Error, Path, Result, TypeTag};

use crate::config::StoreConfig;
use crate::json_utils;

/// A JSON document held in memory and mirrored to a single file.
///
/// Reads only touch memory. Every mutating call rewrites the whole file
/// before it returns, so after a successful mutation the file always holds
/// exactly the in-memory document.
///
/// # Example
///
/// ```rust
/// use pathstore_json_store::JsonFileStore;
/// use serde_json::json;
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut store = JsonFileStore::open(dir.path().join("db.json")).unwrap();
///
/// store.set("users.alice.age", 30).unwrap();
/// store.add("users.alice.age", 1).unwrap();
/// assert_eq!(store.get("users.alice.age").unwrap(), Some(&json!(31)));
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    config: StoreConfig,
    document: Document,
}

impl JsonFileStore {
    /// Open the store backed by `file_path` with default settings.
    pub fn open(file_path: impl Into<path::PathBuf>) -> Result<JsonFileStore> {
        Self::with_config(StoreConfig::new(file_path))
    }

    /// Open a store, creating its backing file with `{}` if it does not exist.
    pub fn with_config(config: StoreConfig) -> Result<JsonFileStore> {
        let document = match json_utils::read_document(&config.path)? {
            Some(document) => document,
            None => {
                log::info!("Creating {}", config.path.display());
                let document = Document::new();
                json_utils::write_document(&config.path, &document, config.write_mode)?;
                document
            }
        };

        Ok(JsonFileStore { config, document })
    }

    /// The backing file.
    pub fn path(&self) -> &path::Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn persist(&self) -> Result<()> {
        log::trace!("Persisting {} top-level keys", self.document.len());
        json_utils::write_document(&self.config.path, &self.document, self.config.write_mode)
    }

    fn write_at(&mut self, path: &Path, value: JsonValue) -> Result<()> {
        value::set_path(&mut self.document, path, value)?;
        self.persist()
    }

    /// Store `value` at `key`, creating intermediate objects, and return it.
    ///
    /// `null`, `false` and `""` are rejected. Every number is accepted,
    /// including `0`.
    pub fn set<V: Serialize>(&mut self, key: &str, value: V) -> Result<JsonValue> {
        let path = Path::parse(key)?;
        let value = to_json(value)?;
        check_set_value(key, &value)?;

        self.write_at(&path, value.clone())?;
        Ok(value)
    }

    /// The value at `key`, or `None` if any segment is missing.
    pub fn get(&self, key: &str) -> Result<Option<&JsonValue>> {
        let path = Path::parse(key)?;
        Ok(value::get_path(&self.document, &path))
    }

    /// Alias of [`get`](Self::get).
    pub fn fetch(&self, key: &str) -> Result<Option<&JsonValue>> {
        self.get(key)
    }

    /// The value at `key` deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(found) => T::deserialize(found)
                .map(Some)
                .map_err(|source| Error::Deserialize {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Whether `key` resolves to a value. `null`, `0` and `false` count.
    pub fn has(&self, key: &str) -> Result<bool> {
        let path = Path::parse(key)?;
        Ok(value::has_path(&self.document, &path))
    }

    /// Remove the value at `key`.
    ///
    /// Returns `false` without touching anything when the value is missing
    /// or falsy (`null`, `false`, `0`, `""`), so a stored `false` cannot be
    /// deleted even though [`has`](Self::has) reports it.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let path = Path::parse(key)?;
        let present = value::get_path(&self.document, &path).is_some_and(value::is_truthy);
        if !present {
            return Ok(false);
        }

        value::remove_path(&mut self.document, &path);
        self.persist()?;
        Ok(true)
    }

    /// Add an integer amount to the number at `key` (missing counts as `0`).
    pub fn add<A: Serialize>(&mut self, key: &str, amount: A) -> Result<Number> {
        self.offset(key, amount, false)
    }

    /// Subtract an integer amount from the number at `key` (missing counts as `0`).
    pub fn subtract<A: Serialize>(&mut self, key: &str, amount: A) -> Result<Number> {
        self.offset(key, amount, true)
    }

    fn offset<A: Serialize>(&mut self, key: &str, amount: A, negate: bool) -> Result<Number> {
        let path = Path::parse(key)?;
        let amount = to_json(amount)?;
        let invalid_amount = |message: String| Error::InvalidAmount {
            key: key.to_string(),
            message,
        };

        // An amount that coerces to 0 is rejected, unlike `set`, which accepts 0.
        let delta = match value::coerce_integer(&amount) {
            Some(0) | None => {
                return Err(invalid_amount(format!(
                    "{} is not a non-zero integer",
                    amount
                )))
            }
            Some(n) if negate => n
                .checked_neg()
                .ok_or_else(|| invalid_amount(format!("{} cannot be negated", n)))?,
            Some(n) => n,
        };

        let current = match value::get_path(&self.document, &path) {
            Some(JsonValue::Number(n)) => n.clone(),
            Some(found) if value::is_truthy(found) => {
                return Err(Error::NotANumber {
                    key: key.to_string(),
                })
            }
            _ => Number::from(0),
        };

        let result = value::offset_number(&current, delta).ok_or_else(|| Error::NotANumber {
            key: key.to_string(),
        })?;
        self.write_at(&path, JsonValue::Number(result.clone()))?;
        Ok(result)
    }

    /// Append `value` to the array at `key` and return the array.
    ///
    /// A missing or falsy value at `key` is replaced by `[value]`. Booleans
    /// (`false` included) and `0` may be pushed; `null` and `""` may not.
    pub fn push<V: Serialize>(&mut self, key: &str, value: V) -> Result<Vec<JsonValue>> {
        let path = Path::parse(key)?;
        let value = to_json(value)?;
        check_push_value(key, &value)?;

        match value::get_path_mut(&mut self.document, &path) {
            Some(JsonValue::Array(items)) => {
                items.push(value);
                let items = items.clone();
                self.persist()?;
                Ok(items)
            }
            Some(found) if value::is_truthy(found) => Err(Error::NotAnArray {
                key: key.to_string(),
            }),
            _ => {
                let items = vec![value];
                self.write_at(&path, JsonValue::Array(items.clone()))?;
                Ok(items)
            }
        }
    }

    /// Remove the first element of the array at `key` equal to `value` and
    /// return the array. Numbers match by value, so `1` pulls `1.0`.
    ///
    /// With `id`, elements are matched on their `id` field instead, which is
    /// how arrays of records are pulled by identifier. The file is rewritten
    /// even when nothing matched.
    pub fn pull<V: Serialize>(
        &mut self,
        key: &str,
        value: V,
        id: Option<&str>,
    ) -> Result<Vec<JsonValue>> {
        let path = Path::parse(key)?;
        let needle = to_json(value)?;

        let items = match value::get_path_mut(&mut self.document, &path) {
            Some(JsonValue::Array(items)) => items,
            Some(found) if value::is_truthy(found) => {
                return Err(Error::NotAnArray {
                    key: key.to_string(),
                })
            }
            _ => {
                return Err(Error::KeyNotFound {
                    key: key.to_string(),
                })
            }
        };

        let position = items.iter().position(|item| match id {
            Some(id) => item.get(id).is_some_and(|field| value::json_eq(field, &needle)),
            None => value::json_eq(item, &needle),
        });
        if let Some(position) = position {
            items.remove(position);
        }

        let items = items.clone();
        self.persist()?;
        Ok(items)
    }

    /// The whole in-memory document.
    pub fn all(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the in-memory document. Changes made through it are
    /// not written until [`save`](Self::save) or the next mutating call.
    pub fn all_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Write the in-memory document to the backing file.
    pub fn save(&self) -> Result<()> {
        self.persist()
    }

    /// The kind of value at `key`.
    pub fn type_of(&self, key: &str) -> Result<TypeTag> {
        Ok(TypeTag::of(self.get(key)?))
    }

    /// Write the document to `"{name}.json"` and return that path.
    ///
    /// The backing file is not touched. `name` must be non-empty and must not
    /// carry the extension.
    pub fn backup(&self, name: impl AsRef<path::Path>) -> Result<path::PathBuf> {
        let name = name.as_ref();
        if name.as_os_str().is_empty() {
            return Err(Error::InvalidFileName {
                name: name.display().to_string(),
            });
        }

        let mut target: ffi::OsString = name.as_os_str().to_owned();
        target.push(".json");
        let target = path::PathBuf::from(target);

        log::info!(
            "Backing up {} to {}",
            self.config.path.display(),
            target.display()
        );
        json_utils::write_document(&target, &self.document, self.config.write_mode)?;
        Ok(target)
    }

    /// Empty the document and the backing file.
    pub fn delete_all(&mut self) -> Result<()> {
        log::info!("Clearing {}", self.config.path.display());
        self.document.clear();
        self.persist()
    }
}

fn to_json<V: Serialize>(value: V) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(Error::Serialize)
}

fn check_set_value(key: &str, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Number(_) => Ok(()),
        found if value::is_truthy(found) => Ok(()),
        rejected => Err(Error::InvalidValue {
            key: key.to_string(),
            message: format!("{} cannot be stored", rejected),
        }),
    }
}

fn check_push_value(key: &str, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Number(_) | JsonValue::Bool(_) => Ok(()),
        found if value::is_truthy(found) => Ok(()),
        rejected => Err(Error::InvalidValue {
            key: key.to_string(),
            message: format!("{} cannot be pushed", rejected),
        }),
    }
}
