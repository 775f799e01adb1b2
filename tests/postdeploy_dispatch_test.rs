//! Post-deploy dispatch with the HTTP validator against a local server

use async_trait::async_trait;
use deployprep::postdeploy::{
    HealthProbe, HttpSiteValidator, PostDeployDispatcher, ProbeError, SiteHandle,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Accepts connections forever, answering each with `status`
async fn serve_forever(status: u16) -> (String, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hit = Arc::new(AtomicBool::new(false));
    let seen = hit.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            seen.store(true, Ordering::SeqCst);
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), hit)
}

struct FailingDetector;

#[async_trait]
impl HealthProbe for FailingDetector {
    async fn run(
        &self,
        _correlation_id: &str,
        _site: &SiteHandle,
        _cancel: CancellationToken,
    ) -> Result<(), ProbeError> {
        Err(ProbeError::Other("detector unavailable".to_string()))
    }

    fn name(&self) -> &str {
        "down-detector"
    }
}

fn validator(max_attempts: u32) -> Arc<HttpSiteValidator> {
    Arc::new(
        HttpSiteValidator::with_settings(
            Duration::from_secs(2),
            Duration::from_millis(20),
            max_attempts,
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_validation_runs_despite_failing_detector() {
    let (url, hit) = serve_forever(200).await;
    let dispatcher =
        PostDeployDispatcher::new(validator(3)).with_down_detector(Arc::new(FailingDetector));
    let site = SiteHandle::new("local", url, true);

    let handles = dispatcher.dispatch(&site, "it-1", &CancellationToken::new());
    assert_eq!(handles.launched(), 2);

    tokio::time::timeout(Duration::from_secs(5), handles.join_all())
        .await
        .unwrap();
    assert!(hit.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_cancel_stops_unhealthy_site_polling() {
    let (url, _hit) = serve_forever(503).await;
    let dispatcher = PostDeployDispatcher::new(validator(1000));
    let site = SiteHandle::new("local", url, false);
    let cancel = CancellationToken::new();

    let handles = dispatcher.dispatch(&site, "it-2", &cancel);
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), handles.join_all())
        .await
        .expect("validator should stop once cancelled");
}
