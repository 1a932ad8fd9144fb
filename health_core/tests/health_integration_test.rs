use async_trait::async_trait;
use health_core::{
    CancellationToken, HealthCheck, HealthConfig, HealthError, HealthStatus, MultiHealthCheck,
    NopHealthCheck, Result, ServiceHealthCheck, ServiceReport,
};
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("health_core=debug")
        .with_test_writer()
        .try_init();
}

/// Probe that sleeps for a fixed time, giving up early on cancellation.
struct SleepyService {
    delay: Duration,
}

#[async_trait]
impl HealthCheck for SleepyService {
    async fn check(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            _ = cancel.cancelled() => Err(HealthError::Cancelled),
            _ = tokio::time::sleep(self.delay) => Ok(()),
        }
    }
}

struct BrokenService {
    error: HealthError,
}

#[async_trait]
impl HealthCheck for BrokenService {
    async fn check(&self, _cancel: &CancellationToken) -> Result<()> {
        Err(self.error.clone())
    }
}

struct AnyhowService;

#[async_trait]
impl HealthCheck for AnyhowService {
    async fn check(&self, _cancel: &CancellationToken) -> Result<()> {
        let _port: u16 = "not a port".parse().map_err(anyhow::Error::from)?;
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_page_flow() {
    init_tracing();

    let boom = HealthError::msg("boom");
    let report = ServiceReport::new();
    let config = HealthConfig::default();

    let mut checker = ServiceHealthCheck::from_config(Some(report.clone()), &config);
    checker.add_service("ok", NopHealthCheck);
    checker.add_service("fail", BrokenService { error: boom.clone() });
    checker.add_service("slow", SleepyService { delay: Duration::from_millis(50) });

    let err = checker.check(&CancellationToken::new()).await.unwrap_err();
    assert!(err.contains(&boom));

    let statuses = report.statuses();
    assert_eq!(statuses.len(), 3);
    assert!(statuses["ok"].error.is_none());
    assert_eq!(statuses["fail"].error.as_ref(), Some(&boom));
    assert!(statuses["slow"].duration >= Duration::from_millis(50));
    assert_eq!(report.overall_status(), HealthStatus::Unhealthy);

    let page = serde_json::to_value(&statuses).unwrap();
    assert_eq!(page["fail"]["error"], "boom");
    assert!(page["ok"]["error"].is_null());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fail_fast_with_caller_deadline() {
    init_tracing();

    let checks: Vec<Arc<dyn HealthCheck>> = vec![
        Arc::new(SleepyService { delay: Duration::from_secs(10) }),
        Arc::new(NopHealthCheck),
    ];
    let checker = MultiHealthCheck::new(checks);

    let cancel = CancellationToken::new();
    let deadline = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        deadline.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), checker.check(&cancel))
        .await
        .expect("check should stop once the caller cancels")
        .unwrap_err();
    assert_eq!(err, HealthError::Cancelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fail_fast_stops_slow_sibling() {
    init_tracing();

    let boom = HealthError::msg("boom");
    let mut checker = MultiHealthCheck::default();
    checker.add(BrokenService { error: boom.clone() });
    checker.add(SleepyService { delay: Duration::from_secs(10) });

    let err = tokio::time::timeout(Duration::from_secs(5), checker.check(&CancellationToken::new()))
        .await
        .expect("slow sibling should be cancelled")
        .unwrap_err();

    assert!(err.contains(&boom));
    assert!(err.contains(&HealthError::Cancelled));
}

#[tokio::test]
async fn test_anyhow_probe_error_is_recorded() {
    let mut checker = ServiceHealthCheck::default();
    checker.add_service("parser", AnyhowService);

    let err = checker.check(&CancellationToken::new()).await.unwrap_err();
    assert!(!err.is_cancelled());

    let status = checker.report().get("parser").unwrap();
    assert_eq!(status.status(), HealthStatus::Unhealthy);
    assert_eq!(status.error.unwrap().to_string(), err.to_string());
}

#[tokio::test]
async fn test_configured_timeout_is_recorded() {
    let config = HealthConfig {
        check_timeout_ms: Some(20),
        ..HealthConfig::default()
    };

    let mut checker = ServiceHealthCheck::from_config(None, &config);
    checker.add_service("stuck", config.apply_timeout(SleepyService { delay: Duration::from_secs(10) }));

    let err = checker.check(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err, HealthError::DeadlineExceeded(Duration::from_millis(20)));

    let status = checker.report().get("stuck").unwrap();
    assert!(status.error.unwrap().is_cancelled());
}
