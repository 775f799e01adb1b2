//! Post-deploy health checks
//!
//! After a deploy, two independent probes are launched in the background:
//! a general site validation and, for Linux sites, a down-detector check.
//! Neither is awaited and neither can fail the deploy.

pub mod dispatcher;
pub mod http;
pub mod probe;
pub mod registry;
pub mod site;

pub use dispatcher::{DispatchHandles, PostDeployDispatcher};
pub use http::HttpSiteValidator;
pub use probe::{HealthProbe, ProbeError};
pub use registry::{CancellationRegistry, Lease};
pub use site::SiteHandle;
