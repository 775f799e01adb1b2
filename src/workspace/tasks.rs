//! Build task definitions and their persistence in `.vscode/tasks.json`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

pub const TASKS_VERSION: &str = "2.0.0";

/// A single task-runner entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub label: String,
    pub command: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

impl TaskSpec {
    pub fn shell(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            task_type: "shell".to_string(),
            depends_on: None,
        }
    }

    pub fn depends_on(mut self, label: impl Into<String>) -> Self {
        self.depends_on = Some(label.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum TasksError {
    #[error("Failed to access tasks file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tasks file {path} is not valid JSON: {source}")]
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

    #[error("Tasks file {0} has an unexpected layout")]
    InvalidLayout(PathBuf),
}

/// Registers task definitions with whatever runs them
pub trait TaskRegistry: Send + Sync {
    fn update_tasks(&self, workspace: &Path, tasks: &[TaskSpec]) -> Result<(), TasksError>;
}

/// `.vscode/tasks.json` backed registry
///
/// Tasks are merged by label: an existing task with the same label is
/// replaced in place, new labels are appended, everything else is kept.
/// Comments in the existing file are accepted but dropped on rewrite.
#[derive(Debug, Clone, Copy, Default)]
pub struct TasksFile;

impl TasksFile {
    pub fn tasks_path(workspace: &Path) -> PathBuf {
        workspace.join(".vscode").join("tasks.json")
    }

    fn load(path: &Path) -> Result<Value, TasksError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(json!({})),
            Ok(content) => json5::from_str(&content).map_err(|source| TasksError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(json!({})),
            Err(source) => Err(TasksError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TaskRegistry for TasksFile {
    fn update_tasks(&self, workspace: &Path, tasks: &[TaskSpec]) -> Result<(), TasksError> {
        let path = Self::tasks_path(workspace);
        let mut document = Self::load(&path)?;

        let root = document
            .as_object_mut()
            .ok_or_else(|| TasksError::InvalidLayout(path.clone()))?;
        root.insert("version".to_string(), json!(TASKS_VERSION));

        let existing = root.entry("tasks").or_insert_with(|| json!([]));
        let existing = existing
            .as_array_mut()
            .ok_or_else(|| TasksError::InvalidLayout(path.clone()))?;

        for task in tasks {
            let value = serde_json::to_value(task).map_err(|source| TasksError::Serialize {
                path: path.clone(),
                source,
            })?;
            match existing
                .iter_mut()
                .find(|t| t.get("label").and_then(Value::as_str) == Some(task.label.as_str()))
            {
                Some(slot) => *slot = value,
                None => existing.push(value),
            }
        }

        debug!(path = %path.display(), count = tasks.len(), "Writing task definitions");

        let io_err = |source| TasksError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut content =
            serde_json::to_string_pretty(&document).map_err(|source| TasksError::Serialize {
                path: path.clone(),
                source,
            })?;
        content.push('\n');
        fs::write(&path, content).map_err(io_err)
    }
}

/// Keeps every registration call in memory
#[derive(Debug, Default)]
pub struct RecordingTaskRegistry {
    calls: Mutex<Vec<Vec<TaskSpec>>>,
}

impl RecordingTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Vec<TaskSpec>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TaskRegistry for RecordingTaskRegistry {
    fn update_tasks(&self, _workspace: &Path, tasks: &[TaskSpec]) -> Result<(), TasksError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(tasks.to_vec());
        }
        Ok(())
    }
}
