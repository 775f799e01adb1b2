//! Pre-deploy configuration inferred from the workspace layout

pub mod discovery;
pub mod inferer;
pub mod site;

pub use discovery::{discover_descriptor, Discovery};
pub use inferer::{InferError, InferOutcome, PreDeployTaskInferer, PublishPlan, SkipReason};
pub use site::RemoteSiteConfig;
