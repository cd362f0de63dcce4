//! Deep merge of JSON values
//!
//! - Objects: merged key by key (recursive)
//! - Arrays: replaced by the overlay
//! - Scalars and mismatched shapes: overlay wins

use serde_json::{Map, Value};

/// Merge `overlay` into `base` in place.
///
/// Keys present only in `base` are left untouched. When `base` and `overlay`
/// hold different kinds of value at the same key, the overlay replaces the
/// base value wholesale.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            merge_maps(base_map, overlay_map);
        }
        (slot, overlay) => *slot = overlay,
    }
}

/// Merge one object into another, key by key.
pub fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, overlay_value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_into(existing, overlay_value),
            None => {
                base.insert(key, overlay_value);
            }
        }
    }
}

/// Deep merge two JSON values, returning the result.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

/// Merge layers in order; the last layer has the highest precedence.
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}
