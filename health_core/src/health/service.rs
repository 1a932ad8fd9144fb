use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::check::HealthCheck;
use super::group::{run_unless_cancelled, CheckGroup};
use super::report::{ServiceReport, ServiceStatus};
use crate::config::HealthConfig;
use crate::error::Result;

/// Checks a set of named services and records every outcome.
///
/// Unlike [`MultiHealthCheck`](super::MultiHealthCheck), a failing service
/// does not cancel the others: each one runs to completion with the caller's
/// token and gets an entry in the [`ServiceReport`].
#[derive(Default)]
pub struct ServiceHealthCheck {
    services: HashMap<String, Arc<dyn HealthCheck>>,
    report: OnceLock<ServiceReport>,
    slow_threshold: Option<Duration>,
}

impl ServiceHealthCheck {
    pub fn new(report: Option<ServiceReport>) -> Self {
        let cell = OnceLock::new();
        if let Some(report) = report {
            let _ = cell.set(report);
        }

        Self {
            services: HashMap::new(),
            report: cell,
            slow_threshold: None,
        }
    }

    pub fn from_config(report: Option<ServiceReport>, config: &HealthConfig) -> Self {
        Self::new(report).with_slow_threshold(config.slow_check_threshold())
    }

    /// Logs a warning for any service slower than `threshold`.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    /// Registers `check` under `name`, replacing any previous service with
    /// that name.
    pub fn add_service<T: HealthCheck + 'static>(&mut self, name: impl Into<String>, check: T) {
        self.services.insert(name.into(), Arc::new(check));
    }

    pub fn with_service<T: HealthCheck + 'static>(mut self, name: impl Into<String>, check: T) -> Self {
        self.add_service(name, check);
        self
    }

    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// The report this checker writes to, created empty on first use when
    /// none was supplied.
    pub fn report(&self) -> &ServiceReport {
        self.report.get_or_init(ServiceReport::new)
    }
}

#[async_trait]
impl HealthCheck for ServiceHealthCheck {
    async fn check(&self, cancel: &CancellationToken) -> Result<()> {
        if self.services.is_empty() {
            return Ok(());
        }

        info!("Running health checks for {} services", self.services.len());

        let report = self.report().clone();
        let mut group = CheckGroup::new();

        for (name, check) in &self.services {
            let name = name.clone();
            let check = Arc::clone(check);
            let cancel = cancel.clone();
            let report = report.clone();
            let slow_threshold = self.slow_threshold;

            group.spawn(async move {
                let start = Instant::now();
                let outcome = run_unless_cancelled(&cancel, check.check(&cancel)).await;
                let duration = start.elapsed();

                match &outcome {
                    Ok(()) => debug!("Health check '{}' passed in {:?}", name, duration),
                    Err(err) => warn!("Health check '{}' failed in {:?}: {}", name, duration, err),
                }
                if slow_threshold.is_some_and(|threshold| duration > threshold) {
                    warn!("Health check '{}' is slow: took {:?}", name, duration);
                }

                report.record(&name, ServiceStatus::new(outcome.clone().err(), duration));
                outcome
            });
        }

        let outcome = group.wait().await;
        info!("Health check completed - Overall status: {}", report.overall_status());
        outcome
    }
}
