use super::site::SiteHandle;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Probe cancelled")]
    Cancelled,

    #[error("Site did not become healthy after {attempts} attempts (last status: {last_status:?})")]
    Unhealthy {
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("Probe setup failed: {0}")]
    Setup(String),

    #[error("{0}")]
    Other(String),
}

/// A post-deploy health check
///
/// Implementations own their error reporting and must honour `cancel`
/// cooperatively.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn run(
        &self,
        correlation_id: &str,
        site: &SiteHandle,
        cancel: CancellationToken,
    ) -> Result<(), ProbeError>;

    fn name(&self) -> &str;
}
