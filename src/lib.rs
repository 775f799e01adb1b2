//! deployprep - pre-deploy task inference and post-deploy health checks
//!
//! Two independent pieces used around a web app deployment:
//!
//! - **Pre-deploy**: inspects a workspace for a .NET project descriptor and,
//!   when the project (or the remote runtime) is .NET, writes the workspace
//!   settings and `clean`/`publish` tasks that produce the deployable output.
//! - **Post-deploy**: launches best-effort health probes against the deployed
//!   site in the background, sharing one correlation id and one cancellation
//!   token.
//!
//! # Example
//!
//! ```no_run
//! use deployprep::fs::RealFileSystem;
//! use deployprep::predeploy::{PreDeployTaskInferer, RemoteSiteConfig};
//! use deployprep::workspace::{DeployContext, JsonSettingsStore, TasksFile};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let inferer = PreDeployTaskInferer::new(RealFileSystem, JsonSettingsStore::default(), TasksFile);
//! let mut context = DeployContext::new("/srv/my-api");
//! let outcome = inferer.infer(&mut context, &RemoteSiteConfig::with_runtime("DOTNETCORE|8.0"))?;
//!
//! if outcome.is_configured() {
//!     println!("Deploying from {}", context.deploy_fs_path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod fs;
pub mod postdeploy;
pub mod predeploy;
pub mod util;
pub mod workspace;

pub use config::{ConfigError, DeployPrepConfig};
pub use postdeploy::{CancellationRegistry, HealthProbe, PostDeployDispatcher, ProbeError, SiteHandle};
pub use predeploy::{InferError, InferOutcome, PreDeployTaskInferer, RemoteSiteConfig};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use workspace::DeployContext;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
