//! Fire-and-forget dispatch of post-deploy health probes

use super::probe::{HealthProbe, ProbeError};
use super::registry::CancellationRegistry;
use super::site::SiteHandle;
use futures_util::FutureExt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Probe outcomes are intentionally dropped: each probe reports its own
/// failures, and none of them may fail the deploy.
fn discard_outcome(_outcome: Result<(), ProbeError>) {}

/// Handles to the spawned probes. Dropping this does not stop them.
#[derive(Debug, Default)]
pub struct DispatchHandles {
    pub validation: Option<JoinHandle<()>>,
    pub down_detector: Option<JoinHandle<()>>,
}

impl DispatchHandles {
    pub fn launched(&self) -> usize {
        usize::from(self.validation.is_some()) + usize::from(self.down_detector.is_some())
    }

    /// Waits for every launched probe; panics inside probes are ignored
    pub async fn join_all(self) {
        for handle in [self.validation, self.down_detector].into_iter().flatten() {
            let _ = handle.await;
        }
    }
}

pub struct PostDeployDispatcher {
    validation: Arc<dyn HealthProbe>,
    down_detector: Option<Arc<dyn HealthProbe>>,
}

impl PostDeployDispatcher {
    pub fn new(validation: Arc<dyn HealthProbe>) -> Self {
        Self {
            validation,
            down_detector: None,
        }
    }

    /// Down-detector probe, only ever launched for Linux sites
    pub fn with_down_detector(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.down_detector = Some(probe);
        self
    }

    /// Launches the probes and returns immediately.
    ///
    /// Outside a Tokio runtime nothing is launched and the returned handles
    /// are empty.
    pub fn dispatch(
        &self,
        site: &SiteHandle,
        correlation_id: &str,
        cancel: &CancellationToken,
    ) -> DispatchHandles {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                site = %site.name,
                correlation_id,
                "No async runtime available, post-deploy probes not started"
            );
            return DispatchHandles::default();
        };

        let validation = spawn_probe(
            &runtime,
            self.validation.clone(),
            site,
            correlation_id,
            cancel,
        );

        let down_detector = match &self.down_detector {
            Some(probe) if site.is_linux => Some(spawn_probe(
                &runtime,
                probe.clone(),
                site,
                correlation_id,
                cancel,
            )),
            _ => None,
        };

        let handles = DispatchHandles {
            validation: Some(validation),
            down_detector,
        };
        debug!(
            site = %site.name,
            correlation_id,
            probes = handles.launched(),
            "Dispatched post-deploy probes"
        );
        handles
    }

    /// Like [`dispatch`](Self::dispatch), but takes the token from
    /// `registry` under `key`, cancelling whatever was registered there
    /// before. The entry is removed once all probes of this dispatch end.
    pub fn dispatch_tracked(
        &self,
        registry: &Arc<CancellationRegistry>,
        key: &str,
        site: &SiteHandle,
        correlation_id: &str,
    ) -> CancellationToken {
        let lease = registry.begin(key);
        let handles = self.dispatch(site, correlation_id, &lease.token);
        let token = lease.token.clone();

        match Handle::try_current() {
            Ok(runtime) => {
                let registry = Arc::clone(registry);
                runtime.spawn(async move {
                    handles.join_all().await;
                    registry.finish(&lease);
                });
            }
            Err(_) => registry.finish(&lease),
        }

        token
    }
}

fn spawn_probe(
    runtime: &Handle,
    probe: Arc<dyn HealthProbe>,
    site: &SiteHandle,
    correlation_id: &str,
    cancel: &CancellationToken,
) -> JoinHandle<()> {
    debug!(probe = probe.name(), site = %site.name, correlation_id, "Starting probe");

    let site = site.clone();
    let correlation_id = correlation_id.to_string();
    let cancel = cancel.clone();

    runtime.spawn(
        async move { probe.run(&correlation_id, &site, cancel).await }.map(discard_outcome),
    )
}
