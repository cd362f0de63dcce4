//! Where a config file lives and what it defaults to
//!
//! A `ConfigLayout` carries the three override points of a config store:
//! the default directory, the default filename, and the declared default
//! values. All of them are fixed when the layout is built.

use serde_json::{Map, Value};
use std::env;
use std::path::{is_separator, Component, Path, PathBuf};

use super::error::ConfigError;
use super::store::{ConfigSource, ConfigStore};

/// Default directory searched when no path is given
pub const DEFAULT_CONFIG_DIRECTORY: &str = ".";

/// Default config filename
pub const DEFAULT_CONFIG_FILENAME: &str = "config.json";

/// Override points for loading a config store
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayout {
    directory: PathBuf,
    filename: String,
    defaults: Map<String, Value>,
}

impl Default for ConfigLayout {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_CONFIG_DIRECTORY),
            filename: DEFAULT_CONFIG_FILENAME.to_string(),
            defaults: Map::new(),
        }
    }
}

impl ConfigLayout {
    /// Create a layout with the built-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory used when no path is given
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set the filename used for the default path and for directory paths
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the declared defaults that loaded data is merged over
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Resolve a candidate path to an absolute config file path.
    ///
    /// - `None`: `directory/filename`
    /// - a path ending in a separator: `candidate/filename`
    /// - anything else: the candidate itself
    ///
    /// Relative results are resolved against the current working directory.
    /// `.` components are dropped from the result.
    pub fn resolve_path(&self, candidate: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let path = match candidate {
            None => self.directory.join(&self.filename),
            Some(dir) if names_directory(dir) => dir.join(&self.filename),
            Some(file) => file.to_path_buf(),
        };

        let absolute = if path.is_absolute() {
            path
        } else {
            let cwd = env::current_dir().map_err(|e| ConfigError::Read {
                path: path.clone(),
                reason: format!("cannot resolve relative path: {}", e),
            })?;
            cwd.join(path)
        };

        Ok(absolute
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect())
    }

    /// Load a store using this layout
    pub fn load(&self, source: ConfigSource) -> Result<ConfigStore, ConfigError> {
        ConfigStore::load(self, source)
    }

    /// Load from an explicit path (file, or directory with a trailing separator)
    pub fn open(&self, path: impl Into<PathBuf>) -> Result<ConfigStore, ConfigError> {
        self.load(ConfigSource::Path(path.into()))
    }

    /// Load from the default path, tolerating a missing file
    pub fn open_default(&self) -> Result<ConfigStore, ConfigError> {
        self.load(ConfigSource::Default)
    }

    /// Build a store from an in-memory object
    pub fn from_object(&self, data: Map<String, Value>) -> Result<ConfigStore, ConfigError> {
        self.load(ConfigSource::Object(data))
    }
}

/// Whether `path` ends in a path separator
fn names_directory(path: &Path) -> bool {
    path.to_string_lossy().chars().last().is_some_and(is_separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::MAIN_SEPARATOR;

    #[test]
    fn test_default_layout() {
        let layout = ConfigLayout::default();
        assert_eq!(layout.directory(), Path::new("."));
        assert_eq!(layout.filename(), "config.json");
        assert!(layout.defaults().is_empty());
    }

    #[test]
    fn test_resolve_no_candidate_uses_directory_and_filename() {
        let layout = ConfigLayout::new()
            .with_directory("/srv/app")
            .with_filename("settings.json");

        let path = layout.resolve_path(None).unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/settings.json"));
    }

    #[test]
    fn test_resolve_trailing_separator_appends_filename() {
        let layout = ConfigLayout::new().with_filename("settings.json");
        let candidate = format!("/srv/app{}", MAIN_SEPARATOR);

        let path = layout.resolve_path(Some(Path::new(&candidate))).unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/settings.json"));
    }

    #[test]
    fn test_resolve_without_trailing_separator_is_a_file() {
        let layout = ConfigLayout::new();

        let path = layout.resolve_path(Some(Path::new("/srv/app"))).unwrap();
        assert_eq!(path, PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_resolve_relative_is_absolute_against_cwd() {
        let layout = ConfigLayout::new();
        let cwd = env::current_dir().unwrap();

        let path = layout.resolve_path(Some(Path::new("conf/app.json"))).unwrap();
        assert!(path.is_absolute());
        assert_eq!(path, cwd.join("conf/app.json"));

        let default = layout.resolve_path(None).unwrap();
        assert_eq!(default, cwd.join("config.json"));
    }

    #[test]
    fn test_resolve_drops_current_dir_components() {
        let layout = ConfigLayout::new();

        let default = layout.resolve_path(None).unwrap();
        let dotted = layout.resolve_path(Some(Path::new("./conf/./app.json"))).unwrap();
        let absolute = layout.resolve_path(Some(Path::new("/srv/./app.json"))).unwrap();

        for path in [&default, &dotted, &absolute] {
            assert!(path.components().all(|c| c != Component::CurDir));
            assert!(!path.to_string_lossy().contains("/./"));
        }
        assert_eq!(absolute.to_string_lossy(), "/srv/app.json");
        assert!(default.ends_with("config.json"));
    }

    #[test]
    fn test_with_defaults() {
        let defaults = json!({"foo": "bar"}).as_object().cloned().unwrap();
        let layout = ConfigLayout::new().with_defaults(defaults);
        assert_eq!(layout.defaults()["foo"], "bar");
    }
}
