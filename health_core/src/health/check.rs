//! The health check contract and its trivial implementations

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{HealthError, Result};

/// Something that can report its health now, honoring cancellation.
///
/// Implementations should return [`HealthError::Cancelled`] promptly once
/// `cancel` fires instead of finishing unnecessary work.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self, cancel: &CancellationToken) -> Result<()>;
}

#[async_trait]
impl<T: HealthCheck + ?Sized> HealthCheck for Arc<T> {
    async fn check(&self, cancel: &CancellationToken) -> Result<()> {
        (**self).check(cancel).await
    }
}

#[async_trait]
impl<T: HealthCheck + ?Sized> HealthCheck for Box<T> {
    async fn check(&self, cancel: &CancellationToken) -> Result<()> {
        (**self).check(cancel).await
    }
}

/// Always healthy. Useful as a default or placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopHealthCheck;

impl NopHealthCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthCheck for NopHealthCheck {
    async fn check(&self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }
}

/// Bounds an inner check by a deadline.
///
/// The inner check receives a child token that is cancelled when the deadline
/// passes; the wrapper then returns [`HealthError::DeadlineExceeded`] without
/// waiting further.
pub struct TimeoutHealthCheck<C> {
    inner: C,
    timeout: Duration,
}

impl<C: HealthCheck> TimeoutHealthCheck<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: HealthCheck> HealthCheck for TimeoutHealthCheck<C> {
    async fn check(&self, cancel: &CancellationToken) -> Result<()> {
        let child = cancel.child_token();
        let _guard = child.clone().drop_guard();

        match tokio::time::timeout(self.timeout, self.inner.check(&child)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Health check exceeded deadline of {:?}", self.timeout);
                Err(HealthError::DeadlineExceeded(self.timeout))
            }
        }
    }
}
