//! Pre-deploy task inference for .NET projects
//!
//! When a workspace looks like a .NET project, the deploy needs a `publish`
//! step before zipping; this module writes the workspace settings and task
//! definitions that make that happen, and redirects the deploy path to the
//! publish output.

use super::discovery::{discover_descriptor, Discovery};
use super::site::RemoteSiteConfig;
use crate::fs::FileSystem;
use crate::workspace::settings::{CONFIGURE_PRE_DEPLOY_TASKS, DEPLOY_SUBPATH, PRE_DEPLOY_TASK};
use crate::workspace::{DeployContext, SettingsError, SettingsStore, TaskRegistry, TaskSpec, TasksError};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const CLEAN_TASK: &str = "clean";
pub const PUBLISH_TASK: &str = "publish";
pub const CSPROJ_COUNT_PROPERTY: &str = "numOfCsprojFiles";

/// Publish output relative to the workspace root. The target framework is
/// deliberately left out of the path.
const PUBLISH_SEGMENTS: [&str; 3] = ["bin", "Debug", "publish"];

#[derive(Debug, Error)]
pub enum InferError {
    #[error("Failed to scan workspace {path} for project files: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Tasks(#[from] TasksError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    AutoConfigureDisabled,
    PreDeployTaskExists { task: String },
}

/// Everything written for a configured workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishPlan {
    pub descriptor: Option<PathBuf>,
    pub discovered: usize,
    pub project_dir: PathBuf,
    pub deploy_subpath: String,
    pub publish_path: PathBuf,
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InferOutcome {
    Skipped(SkipReason),
    NotApplicable { discovered: usize },
    Configured(PublishPlan),
}

impl InferOutcome {
    pub fn is_configured(&self) -> bool {
        matches!(self, InferOutcome::Configured(_))
    }
}

pub struct PreDeployTaskInferer<F: FileSystem, S: SettingsStore, T: TaskRegistry> {
    fs: F,
    settings: S,
    tasks: T,
}

impl<F: FileSystem, S: SettingsStore, T: TaskRegistry> PreDeployTaskInferer<F, S, T> {
    pub fn new(fs: F, settings: S, tasks: T) -> Self {
        Self {
            fs,
            settings,
            tasks,
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn tasks(&self) -> &T {
        &self.tasks
    }

    /// Configures `preDeployTask`/`deploySubpath` and the clean/publish
    /// tasks for a .NET workspace.
    ///
    /// Never overwrites an existing `preDeployTask`. Applies when exactly one
    /// `.csproj` is found, or when the remote runtime is .NET (in which case
    /// the project is assumed to live at the workspace root).
    pub fn infer(
        &self,
        context: &mut DeployContext,
        site: &RemoteSiteConfig,
    ) -> Result<InferOutcome, InferError> {
        let root = context.workspace.clone();

        if let Some(reason) = self.skip_reason(&root)? {
            debug!(workspace = %root.display(), ?reason, "Skipping pre-deploy task inference");
            return Ok(InferOutcome::Skipped(reason));
        }

        let discovery =
            discover_descriptor(&self.fs, &root).map_err(|source| InferError::Discovery {
                path: root.clone(),
                source,
            })?;
        context.record(CSPROJ_COUNT_PROPERTY, discovery.count());

        if discovery.descriptor().is_none() && !site.is_dotnet() {
            debug!(
                workspace = %root.display(),
                csproj_count = discovery.count(),
                runtime = site.runtime_identifier().unwrap_or(""),
                "Workspace is not a .NET project"
            );
            return Ok(InferOutcome::NotApplicable {
                discovered: discovery.count(),
            });
        }

        let plan = plan_publish(&root, &discovery);

        // `preDeployTask` is the skip guard; it must be the last write.
        self.tasks.update_tasks(&root, &plan.tasks)?;
        self.settings
            .update(&root, DEPLOY_SUBPATH, json!(plan.deploy_subpath))?;
        self.settings
            .update(&root, PRE_DEPLOY_TASK, json!(PUBLISH_TASK))?;

        context.deploy_fs_path = plan.publish_path.clone();

        info!(
            workspace = %root.display(),
            project_dir = %plan.project_dir.display(),
            publish_path = %plan.publish_path.display(),
            "Configured .NET pre-deploy tasks"
        );

        Ok(InferOutcome::Configured(plan))
    }

    fn skip_reason(&self, root: &Path) -> Result<Option<SkipReason>, InferError> {
        let enabled = self
            .settings
            .get_bool(root, CONFIGURE_PRE_DEPLOY_TASKS)?
            .unwrap_or(true);
        if !enabled {
            return Ok(Some(SkipReason::AutoConfigureDisabled));
        }

        Ok(self
            .settings
            .get_string(root, PRE_DEPLOY_TASK)?
            .map(|task| SkipReason::PreDeployTaskExists { task }))
    }
}

fn plan_publish(root: &Path, discovery: &Discovery) -> PublishPlan {
    let relative: PathBuf = PUBLISH_SEGMENTS.iter().collect();
    let publish_path = root.join(&relative);
    let project_dir = discovery.project_dir(root);

    let tasks = vec![
        TaskSpec::shell(
            CLEAN_TASK,
            format!("dotnet clean {}", project_dir.display()),
        ),
        TaskSpec::shell(
            PUBLISH_TASK,
            format!(
                "dotnet publish {} -o {}",
                project_dir.display(),
                publish_path.display()
            ),
        )
        .depends_on(CLEAN_TASK),
    ];

    PublishPlan {
        descriptor: discovery.descriptor().map(Path::to_path_buf),
        discovered: discovery.count(),
        project_dir,
        deploy_subpath: PUBLISH_SEGMENTS.join("/"),
        publish_path,
        tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::workspace::{InMemorySettings, RecordingTaskRegistry};
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};

    type TestInferer = PreDeployTaskInferer<MockFileSystem, InMemorySettings, RecordingTaskRegistry>;

    fn inferer(fs: MockFileSystem, settings: InMemorySettings) -> TestInferer {
        PreDeployTaskInferer::new(fs, settings, RecordingTaskRegistry::new())
    }

    fn node_site() -> RemoteSiteConfig {
        RemoteSiteConfig::with_runtime("NODE|18-lts")
    }

    fn assert_no_writes(inferer: &TestInferer) {
        assert!(inferer.settings().writes().is_empty());
        assert!(inferer.tasks().calls().is_empty());
    }

    #[test]
    fn test_disabled_setting_is_noop() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/App.csproj");
        let settings = InMemorySettings::new().with(ws, CONFIGURE_PRE_DEPLOY_TASKS, json!(false));
        let inferer = inferer(fs, settings);
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer
            .infer(&mut ctx, &RemoteSiteConfig::with_runtime("DOTNETCORE|8.0"))
            .unwrap();

        assert_eq!(outcome, InferOutcome::Skipped(SkipReason::AutoConfigureDisabled));
        assert_no_writes(&inferer);
        assert_eq!(ctx.deploy_fs_path, PathBuf::from("/ws"));
    }

    #[test]
    fn test_existing_pre_deploy_task_is_kept() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/App.csproj");
        let settings = InMemorySettings::new().with(ws, PRE_DEPLOY_TASK, json!("build"));
        let inferer = inferer(fs, settings);
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer.infer(&mut ctx, &RemoteSiteConfig::default()).unwrap();

        assert_eq!(
            outcome,
            InferOutcome::Skipped(SkipReason::PreDeployTaskExists {
                task: "build".to_string()
            })
        );
        assert_no_writes(&inferer);
    }

    #[test]
    fn test_skip_does_not_touch_filesystem() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_dir("/ws").deny_read("/ws");
        let settings = InMemorySettings::new().with(ws, CONFIGURE_PRE_DEPLOY_TASKS, json!(false));
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer(fs, settings)
            .infer(&mut ctx, &RemoteSiteConfig::default())
            .unwrap();
        assert!(!outcome.is_configured());
        assert!(ctx.telemetry.is_empty());
    }

    #[test]
    fn test_descriptor_in_subdirectory() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/README.md").add_file("/ws/src/App.csproj");
        let inferer = inferer(fs, InMemorySettings::new());
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer.infer(&mut ctx, &node_site()).unwrap();

        let InferOutcome::Configured(plan) = outcome else {
            panic!("expected configured outcome");
        };
        assert_eq!(plan.project_dir, PathBuf::from("/ws/src"));
        assert_eq!(plan.publish_path, PathBuf::from("/ws/bin/Debug/publish"));
        assert_eq!(ctx.deploy_fs_path, PathBuf::from("/ws/bin/Debug/publish"));
        assert_eq!(ctx.telemetry.get(CSPROJ_COUNT_PROPERTY).map(String::as_str), Some("1"));

        assert_eq!(
            inferer.settings().writes(),
            vec![
                (DEPLOY_SUBPATH.to_string(), json!("bin/Debug/publish")),
                (PRE_DEPLOY_TASK.to_string(), json!("publish")),
            ]
        );

        let calls = inferer.tasks().calls();
        assert_eq!(calls.len(), 1);
        let tasks = &calls[0];
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].label, "clean");
        assert_eq!(tasks[0].command, "dotnet clean /ws/src");
        assert_eq!(tasks[1].label, "publish");
        assert_eq!(tasks[1].command, "dotnet publish /ws/src -o /ws/bin/Debug/publish");
        assert_eq!(tasks[1].depends_on.as_deref(), Some(tasks[0].label.as_str()));
        assert!(tasks.iter().all(|t| t.task_type == "shell"));
    }

    #[test]
    fn test_dotnet_runtime_without_descriptor_uses_root() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/index.html");
        let inferer = inferer(fs, InMemorySettings::new());
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer
            .infer(&mut ctx, &RemoteSiteConfig::with_runtime("DotNetCore|8.0"))
            .unwrap();

        let InferOutcome::Configured(plan) = outcome else {
            panic!("expected configured outcome");
        };
        assert_eq!(plan.descriptor, None);
        assert_eq!(plan.discovered, 0);
        assert_eq!(plan.project_dir, PathBuf::from("/ws"));
        assert_eq!(plan.tasks[0].command, "dotnet clean /ws");
    }

    #[test]
    fn test_not_dotnet_is_noop() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/package.json");
        let inferer = inferer(fs, InMemorySettings::new());
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer.infer(&mut ctx, &node_site()).unwrap();

        assert_eq!(outcome, InferOutcome::NotApplicable { discovered: 0 });
        assert_no_writes(&inferer);
        assert_eq!(ctx.deploy_fs_path, PathBuf::from("/ws"));
        assert_eq!(ctx.telemetry.get(CSPROJ_COUNT_PROPERTY).map(String::as_str), Some("0"));
    }

    #[test]
    fn test_ambiguous_descriptors_without_dotnet_runtime() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/a/A.csproj").add_file("/ws/b/B.csproj");
        let inferer = inferer(fs, InMemorySettings::new());
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer.infer(&mut ctx, &RemoteSiteConfig::default()).unwrap();

        assert_eq!(outcome, InferOutcome::NotApplicable { discovered: 2 });
        assert_no_writes(&inferer);
    }

    #[test]
    fn test_ambiguous_descriptors_with_dotnet_runtime_fall_back_to_root() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/a/A.csproj").add_file("/ws/b/B.csproj");
        let inferer = inferer(fs, InMemorySettings::new());
        let mut ctx = DeployContext::new(ws);

        let outcome = inferer
            .infer(&mut ctx, &RemoteSiteConfig::with_runtime("DOTNETCORE|8.0"))
            .unwrap();

        let InferOutcome::Configured(plan) = outcome else {
            panic!("expected configured outcome");
        };
        assert_eq!(plan.discovered, 2);
        assert_eq!(plan.project_dir, PathBuf::from("/ws"));
    }

    #[test]
    fn test_discovery_error_propagates_without_writes() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_dir("/ws/private").deny_read("/ws/private");
        let inferer = inferer(fs, InMemorySettings::new());
        let mut ctx = DeployContext::new(ws);

        let err = inferer
            .infer(&mut ctx, &RemoteSiteConfig::with_runtime("DOTNETCORE|8.0"))
            .unwrap_err();

        assert!(matches!(err, InferError::Discovery { .. }));
        assert_no_writes(&inferer);
    }

    /// Rejects the first registration, accepts the rest
    #[derive(Default)]
    struct FailOnceTaskRegistry {
        failed: AtomicBool,
    }

    impl TaskRegistry for FailOnceTaskRegistry {
        fn update_tasks(&self, workspace: &Path, _tasks: &[TaskSpec]) -> Result<(), TasksError> {
            if self.failed.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(TasksError::InvalidLayout(workspace.join(".vscode/tasks.json")))
            }
        }
    }

    #[test]
    fn test_failed_task_write_leaves_workspace_retryable() {
        let ws = Path::new("/ws");
        let mut fs = MockFileSystem::new();
        fs.add_file("/ws/App.csproj");
        let inferer = PreDeployTaskInferer::new(
            fs,
            InMemorySettings::new(),
            FailOnceTaskRegistry::default(),
        );
        let mut ctx = DeployContext::new(ws);

        let err = inferer
            .infer(&mut ctx, &RemoteSiteConfig::default())
            .unwrap_err();
        assert!(matches!(err, InferError::Tasks(_)));
        assert!(inferer.settings().writes().is_empty());
        assert_eq!(ctx.deploy_fs_path, PathBuf::from("/ws"));

        let retry = inferer.infer(&mut ctx, &RemoteSiteConfig::default()).unwrap();
        assert!(retry.is_configured());
        assert_eq!(ctx.deploy_fs_path, PathBuf::from("/ws/bin/Debug/publish"));
        assert_eq!(
            inferer.settings().get_string(ws, PRE_DEPLOY_TASK).unwrap(),
            Some("publish".to_string())
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(InferOutcome::NotApplicable { discovered: 3 }).unwrap();
        assert_eq!(value["status"], Value::from("not_applicable"));
        assert_eq!(value["discovered"], Value::from(3));
    }
}
