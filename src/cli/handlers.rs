use super::commands::{CheckArgs, ConfigureArgs};
use super::output::OutputFormatter;
use crate::config::DeployPrepConfig;
use crate::fs::RealFileSystem;
use crate::postdeploy::{HealthProbe, HttpSiteValidator, SiteHandle};
use crate::predeploy::{PreDeployTaskInferer, RemoteSiteConfig};
use crate::workspace::{DeployContext, JsonSettingsStore, TasksFile};
use anyhow::{Context, Result};
use std::env;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

pub fn handle_configure(args: &ConfigureArgs, config: &DeployPrepConfig) -> i32 {
    match run_configure(args, config) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_configure(args: &ConfigureArgs, config: &DeployPrepConfig) -> Result<String> {
    let workspace = match &args.workspace {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to determine current directory")?,
    };
    let workspace = workspace
        .canonicalize()
        .with_context(|| format!("Workspace not found: {}", workspace.display()))?;

    let site = args
        .runtime
        .clone()
        .map(RemoteSiteConfig::with_runtime)
        .unwrap_or_default();

    let inferer = PreDeployTaskInferer::new(
        RealFileSystem,
        JsonSettingsStore::new(config.settings_prefix.clone()),
        TasksFile,
    );
    let mut context = DeployContext::new(&workspace);
    let outcome = inferer.infer(&mut context, &site)?;

    debug!(
        deploy_fs_path = %context.deploy_fs_path.display(),
        telemetry = ?context.telemetry,
        "Pre-deploy inference finished"
    );

    OutputFormatter::new(args.format.into()).format_outcome(&outcome)
}

pub async fn handle_check(args: &CheckArgs, config: &DeployPrepConfig) -> i32 {
    let validator = match HttpSiteValidator::from_config(config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    // Only site validation runs here; the down-detector needs provider diagnostics.
    let site = SiteHandle::new(
        args.name.clone().unwrap_or_else(|| args.host.clone()),
        args.host.clone(),
        false,
    );
    let correlation_id = args
        .correlation_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    info!(site = %site.name, correlation_id = %correlation_id, "Checking site health");
    let result = validator.run(&correlation_id, &site, cancel).await;
    ctrl_c.abort();

    match result {
        Ok(()) => {
            println!("{} is responding (correlation id {})", site.url(), correlation_id);
            0
        }
        Err(e) => {
            eprintln!("{}: {} (correlation id {})", site.url(), e, correlation_id);
            1
        }
    }
}
