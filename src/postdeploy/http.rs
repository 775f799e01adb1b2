//! HTTP site validation probe
//!
//! Polls the site's root URL until it answers with anything other than a
//! server error. Cold starts right after a deploy routinely take tens of
//! seconds, so a few failed attempts are expected.

use super::probe::{HealthProbe, ProbeError};
use super::site::SiteHandle;
use crate::config::DeployPrepConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_MAX_ATTEMPTS: u32 = 12;

pub struct HttpSiteValidator {
    http_client: Client,
    poll_interval: Duration,
    max_attempts: u32,
}

impl HttpSiteValidator {
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_settings(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            DEFAULT_MAX_ATTEMPTS,
        )
    }

    pub fn from_config(config: &DeployPrepConfig) -> Result<Self, ProbeError> {
        Self::with_settings(
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.probe_interval_secs),
            config.probe_max_attempts,
        )
    }

    pub fn with_settings(
        timeout: Duration,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Result<Self, ProbeError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Setup(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            poll_interval,
            max_attempts: max_attempts.max(1),
        })
    }

    /// One request; `None` means the site could not be reached at all
    async fn attempt(&self, url: &str, correlation_id: &str) -> Option<u16> {
        match self.http_client.get(url).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                if e.is_timeout() {
                    debug!(correlation_id, url, "Site validation request timed out");
                } else if e.is_connect() {
                    debug!(correlation_id, url, "Cannot connect to site");
                } else {
                    debug!(correlation_id, url, error = %e, "Site validation request failed");
                }
                None
            }
        }
    }
}

#[async_trait]
impl HealthProbe for HttpSiteValidator {
    async fn run(
        &self,
        correlation_id: &str,
        site: &SiteHandle,
        cancel: CancellationToken,
    ) -> Result<(), ProbeError> {
        let url = site.url();
        let mut last_status = None;

        for attempt in 1..=self.max_attempts {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
                status = self.attempt(&url, correlation_id) => status,
            };

            match status {
                Some(code) if code < 500 => {
                    info!(correlation_id, site = %site.name, status = code, attempt, "Site is responding");
                    return Ok(());
                }
                Some(code) => {
                    debug!(correlation_id, status = code, attempt, "Site returned a server error");
                    last_status = Some(code);
                }
                None => {}
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }

        warn!(
            correlation_id,
            site = %site.name,
            attempts = self.max_attempts,
            ?last_status,
            "Site did not respond successfully after deploy"
        );
        Err(ProbeError::Unhealthy {
            attempts: self.max_attempts,
            last_status,
        })
    }

    fn name(&self) -> &str {
        "site-validation"
    }
}
