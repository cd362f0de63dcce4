//! Application options
//!
//! Options are a JSON object deep-merged over the built-in defaults.
//! Only `isDebugging` is interpreted by the runner; any other key is kept
//! for the application's own use.

use launchpad_config::deep_merge;
use serde_json::{json, Map, Value};

/// Option key that enables debug logging
pub const IS_DEBUGGING: &str = "isDebugging";

/// Built-in default options
pub fn default_options() -> Value {
    json!({ IS_DEBUGGING: false })
}

/// Resolved application options
#[derive(Debug, Clone, PartialEq)]
pub struct AppOptions {
    values: Map<String, Value>,
}

impl AppOptions {
    /// Merge `supplied` over the default options
    pub fn resolve(supplied: Map<String, Value>) -> Self {
        match deep_merge(default_options(), Value::Object(supplied)) {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn is_debugging(&self) -> bool {
        self.values
            .get(IS_DEBUGGING)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl Default for AppOptions {
    fn default() -> Self {
        let values = match default_options() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { values }
    }
}
