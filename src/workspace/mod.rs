//! Workspace-side collaborators: settings, task definitions and the
//! per-deploy context

pub mod context;
pub mod settings;
pub mod tasks;

pub use context::DeployContext;
pub use settings::{InMemorySettings, JsonSettingsStore, SettingsError, SettingsStore};
pub use tasks::{RecordingTaskRegistry, TaskRegistry, TaskSpec, TasksError, TasksFile};
