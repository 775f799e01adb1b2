use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// State carried between the stages of a single deploy
///
/// `deploy_fs_path` is resolved early and may be redirected by later
/// stages (e.g. to a publish output directory); whoever reads it must run
/// after those stages.
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub workspace: PathBuf,
    pub deploy_fs_path: PathBuf,
    pub telemetry: BTreeMap<String, String>,
}

impl DeployContext {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            deploy_fs_path: workspace.clone(),
            workspace,
            telemetry: BTreeMap::new(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn record(&mut self, key: impl Into<String>, value: impl ToString) {
        self.telemetry.insert(key.into(), value.to_string());
    }
}
