use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::check::HealthCheck;
use super::group::{run_unless_cancelled, CheckGroup};
use crate::error::Result;

/// Runs several checks concurrently and fails fast.
///
/// The first failing member cancels the token handed to its siblings. The
/// check still waits for every member before returning.
#[derive(Clone, Default)]
pub struct MultiHealthCheck {
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl MultiHealthCheck {
    pub fn new(checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        Self { checks }
    }

    pub fn add<T: HealthCheck + 'static>(&mut self, check: T) {
        self.checks.push(Arc::new(check));
    }

    pub fn with_check<T: HealthCheck + 'static>(mut self, check: T) -> Self {
        self.add(check);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[async_trait]
impl HealthCheck for MultiHealthCheck {
    async fn check(&self, cancel: &CancellationToken) -> Result<()> {
        if self.checks.is_empty() {
            return Ok(());
        }

        debug!("Running {} health checks (fail fast)", self.checks.len());

        let (mut group, child) = CheckGroup::with_cancel(cancel);

        for check in &self.checks {
            let check = Arc::clone(check);
            let parent = cancel.clone();
            let child = child.clone();
            group.spawn(async move {
                run_unless_cancelled(&parent, check.check(&child)).await
            });
        }

        let outcome = group.wait().await;
        if let Err(err) = &outcome {
            warn!("Health check failed: {}", err);
        }
        outcome
    }
}
