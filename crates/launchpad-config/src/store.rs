//! The config store: load, merge, access, write back

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::layout::ConfigLayout;
use super::merge::{merge_layers, merge_maps};

/// Where a store's source data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// The layout's default path; a missing file means "no config yet"
    Default,
    /// An explicit file path, or a directory when it ends in a separator
    Path(PathBuf),
    /// In-memory data, no file involved
    Object(Map<String, Value>),
}

/// Merged configuration data with an optional origin file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    data: Map<String, Value>,
    origin: Option<PathBuf>,
}

impl ConfigStore {
    /// Load a store.
    ///
    /// Source data is deep-merged over the layout's declared defaults, which
    /// are in turn merged over the built-in (empty) defaults.
    pub fn load(layout: &ConfigLayout, source: ConfigSource) -> Result<Self, ConfigError> {
        let (source_data, origin) = match source {
            ConfigSource::Object(data) => (data, None),
            ConfigSource::Default => {
                let path = layout.resolve_path(None)?;
                match fs::read(&path) {
                    Ok(bytes) => (parse_object(&path, &bytes)?, Some(path)),
                    Err(_) => (Map::new(), None),
                }
            }
            ConfigSource::Path(candidate) => {
                let path = layout.resolve_path(Some(&candidate))?;
                let bytes = fs::read(&path).map_err(|e| ConfigError::Read {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                (parse_object(&path, &bytes)?, Some(path))
            }
        };

        let merged = merge_layers([
            Value::Object(Map::new()),
            Value::Object(layout.defaults().clone()),
            Value::Object(source_data),
        ]);

        let data = match merged {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Self { data, origin })
    }

    /// Load from an explicit path with the default layout
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        ConfigLayout::default().open(path)
    }

    /// Load `./config.json` if it exists, otherwise start empty
    pub fn open_default() -> Result<Self, ConfigError> {
        ConfigLayout::default().open_default()
    }

    /// Build a store from in-memory data with the default layout
    pub fn from_object(data: Map<String, Value>) -> Result<Self, ConfigError> {
        ConfigLayout::default().from_object(data)
    }

    /// The absolute path this store was loaded from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Get a value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.data.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Set a top-level key, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Set a value by dot-separated path.
    ///
    /// Missing intermediate objects are created; a non-object value in the
    /// way is replaced by an object.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) {
        let mut parts: Vec<&str> = path.split('.').collect();
        let Some(leaf) = parts.pop() else {
            return;
        };

        let mut current = &mut self.data;
        for part in parts {
            let slot = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            current = map;
        }
        current.insert(leaf.to_string(), value.into());
    }

    /// Remove a top-level key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Deep-merge more data over the current contents
    pub fn merge(&mut self, overlay: Map<String, Value>) {
        merge_maps(&mut self.data, overlay);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Deserialize the data into a typed view
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.to_value())
            .map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Serialize the data (never the origin) to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.data)
    }

    /// Write the data to `path`, or to the origin when no path is given.
    ///
    /// Overwrites the target in place; the write is not atomic. Returns the
    /// path that was written.
    pub fn write(&self, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let target = path
            .or(self.origin.as_deref())
            .map(Path::to_path_buf)
            .ok_or(ConfigError::NoPath)?;

        let mut json = self.to_json().map_err(|e| ConfigError::Write {
            path: target.clone(),
            reason: format!("JSON serialization failed: {}", e),
        })?;
        json.push('\n');

        fs::write(&target, json).map_err(|e| ConfigError::Write {
            path: target.clone(),
            reason: e.to_string(),
        })?;

        Ok(target)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            data: Map::new(),
            origin: None,
        }
    }
}

/// Parse file bytes as a JSON object
fn parse_object(path: &Path, bytes: &[u8]) -> Result<Map<String, Value>, ConfigError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            reason: format!("top-level value must be an object, found {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
