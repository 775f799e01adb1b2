//! Workspace settings persistence
//!
//! Settings live in `<workspace>/.vscode/settings.json`, namespaced under a
//! prefix (`appService.preDeployTask`). Keys this crate does not own are
//! left untouched on write. The file is read as JSON with comments (the
//! editor's own format); comments are not carried over on write.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

pub const CONFIGURE_PRE_DEPLOY_TASKS: &str = "configurePreDeployTasks";
pub const PRE_DEPLOY_TASK: &str = "preDeployTask";
pub const DEPLOY_SUBPATH: &str = "deploySubpath";

pub const DEFAULT_SETTINGS_PREFIX: &str = "appService";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings file {0} must contain a JSON object")]
    NotAnObject(PathBuf),
}

/// Read/write access to per-workspace settings
pub trait SettingsStore: Send + Sync {
    fn get(&self, workspace: &Path, key: &str) -> Result<Option<Value>, SettingsError>;

    fn update(&self, workspace: &Path, key: &str, value: Value) -> Result<(), SettingsError>;

    fn get_bool(&self, workspace: &Path, key: &str) -> Result<Option<bool>, SettingsError> {
        Ok(self.get(workspace, key)?.and_then(|v| v.as_bool()))
    }

    /// Returns the value only when it is a non-empty string
    fn get_string(&self, workspace: &Path, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self
            .get(workspace, key)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty()))
    }
}

/// `.vscode/settings.json` backed store
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    prefix: String,
}

impl Default for JsonSettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_PREFIX)
    }
}

impl JsonSettingsStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn settings_path(workspace: &Path) -> PathBuf {
        workspace.join(".vscode").join("settings.json")
    }

    fn qualified(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn load(&self, path: &Path) -> Result<Map<String, Value>, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match json5::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SettingsError::NotAnObject(path.to_path_buf())),
            Err(source) => Err(SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, workspace: &Path, key: &str) -> Result<Option<Value>, SettingsError> {
        let path = Self::settings_path(workspace);
        let mut map = self.load(&path)?;
        Ok(map.remove(&self.qualified(key)))
    }

    fn update(&self, workspace: &Path, key: &str, value: Value) -> Result<(), SettingsError> {
        let path = Self::settings_path(workspace);
        let mut map = self.load(&path)?;
        let qualified = self.qualified(key);

        debug!(setting = %qualified, value = %value, "Updating workspace setting");
        map.insert(qualified, value);

        let io_err = |source| SettingsError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut content = serde_json::to_string_pretty(&Value::Object(map)).map_err(|source| {
            SettingsError::Serialize {
                path: path.clone(),
                source,
            }
        })?;
        content.push('\n');
        fs::write(&path, content).map_err(io_err)
    }
}

/// Process-local store, keyed by workspace path
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: Mutex<HashMap<(PathBuf, String), Value>>,
    writes: Mutex<Vec<(String, Value)>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, workspace: &Path, key: &str, value: Value) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert((workspace.to_path_buf(), key.to_string()), value);
        }
        self
    }

    /// Every `update` call in order, excluding values seeded via `with`
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, workspace: &Path, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self
            .values
            .lock()
            .ok()
            .and_then(|v| v.get(&(workspace.to_path_buf(), key.to_string())).cloned()))
    }

    fn update(&self, workspace: &Path, key: &str, value: Value) -> Result<(), SettingsError> {
        if let Ok(mut values) = self.values.lock() {
            values.insert((workspace.to_path_buf(), key.to_string()), value.clone());
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((key.to_string(), value));
        }
        Ok(())
    }
}
