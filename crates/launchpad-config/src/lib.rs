//! JSON configuration store with layered defaults.
//!
//! A store is loaded from a JSON file (or built from an in-memory object),
//! deep-merged over declared defaults, mutated freely, and optionally
//! written back to disk.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults (empty)
//! 2. Defaults declared on the [`ConfigLayout`]
//! 3. Source data (file or object)

mod error;
mod layout;
mod merge;
mod store;

pub use error::ConfigError;
pub use layout::{ConfigLayout, DEFAULT_CONFIG_DIRECTORY, DEFAULT_CONFIG_FILENAME};
pub use merge::{deep_merge, merge_into, merge_layers, merge_maps};
pub use store::{ConfigSource, ConfigStore};
