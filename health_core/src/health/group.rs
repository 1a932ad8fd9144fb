use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::error;

use crate::error::{HealthError, Result};

/// Runs a batch of checks as spawned tasks and joins their outcomes.
///
/// Dropping the group aborts whatever is still running, so no task outlives
/// the `check` call that created it.
pub(crate) struct CheckGroup {
    tasks: JoinSet<Result<()>>,
    cancel_on_error: Option<CancellationToken>,
    _guard: Option<DropGuard>,
}

impl CheckGroup {
    /// Group that lets every task run to completion.
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel_on_error: None,
            _guard: None,
        }
    }

    /// Group whose first failing task cancels the returned child of `parent`.
    /// The child is also cancelled once the group is dropped.
    pub fn with_cancel(parent: &CancellationToken) -> (Self, CancellationToken) {
        let child = parent.child_token();
        let group = Self {
            tasks: JoinSet::new(),
            cancel_on_error: Some(child.clone()),
            _guard: Some(child.clone().drop_guard()),
        };
        (group, child)
    }

    pub fn spawn<F>(&mut self, check: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let cancel = self.cancel_on_error.clone();
        self.tasks.spawn(async move {
            let outcome = check.await;
            if let (Err(_), Some(cancel)) = (&outcome, cancel) {
                cancel.cancel();
            }
            outcome
        });
    }

    /// Waits for every task. Failures are joined in completion order.
    pub async fn wait(mut self) -> Result<()> {
        let mut errors = Vec::new();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(join_err) if join_err.is_panic() => {
                    error!("Health check task panicked");
                    std::panic::resume_unwind(join_err.into_panic());
                }
                Err(_) => errors.push(HealthError::Cancelled),
            }
        }

        HealthError::join(errors)
    }
}

/// Runs `check` unless `signal` is already cancelled, in which case the member
/// reports cancellation without probing.
pub(crate) async fn run_unless_cancelled<F>(signal: &CancellationToken, check: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    if signal.is_cancelled() {
        return Err(HealthError::Cancelled);
    }
    check.await
}
