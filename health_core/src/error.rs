//! Health check error types

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HealthError>;

/// Shared, opaque failure produced by a probe.
pub type ProbeError = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Error, Debug, Clone)]
pub enum HealthError {
    #[error(transparent)]
    Probe(ProbeError),

    #[error("health check cancelled")]
    Cancelled,

    #[error("health check deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("{}", AggregateDisplay(.0))]
    Aggregate(Vec<HealthError>),
}

struct AggregateDisplay<'a>(&'a [HealthError]);

impl fmt::Display for AggregateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} health checks failed: ", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
#[error("{0}")]
struct MessageError(String);

impl HealthError {
    /// Wraps an arbitrary probe failure.
    pub fn probe<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        HealthError::Probe(Arc::new(err))
    }

    /// Probe failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        HealthError::probe(MessageError(message.into()))
    }

    /// Joins member failures. No failures is success, a single failure is
    /// returned as is, several become an `Aggregate`.
    pub fn join(mut errors: Vec<HealthError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(HealthError::Aggregate(errors)),
        }
    }

    /// True if cancellation or an expired deadline caused this error or any
    /// of its causes.
    pub fn is_cancelled(&self) -> bool {
        self.causes()
            .any(|e| matches!(e, HealthError::Cancelled | HealthError::DeadlineExceeded(_)))
    }

    /// True if `target` is this error or one of its (possibly nested) causes.
    pub fn contains(&self, target: &HealthError) -> bool {
        if self == target {
            return true;
        }
        match self {
            HealthError::Aggregate(errors) => errors.iter().any(|e| e.contains(target)),
            _ => false,
        }
    }

    /// Finds the first probe cause of concrete type `E`.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.causes().find_map(|e| match e {
            HealthError::Probe(inner) => inner.downcast_ref::<E>(),
            _ => None,
        })
    }

    /// Leaf errors, with aggregates flattened.
    pub fn causes(&self) -> Causes<'_> {
        Causes { stack: vec![self] }
    }
}

pub struct Causes<'a> {
    stack: Vec<&'a HealthError>,
}

impl<'a> Iterator for Causes<'a> {
    type Item = &'a HealthError;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(err) = self.stack.pop() {
            match err {
                HealthError::Aggregate(errors) => self.stack.extend(errors.iter().rev()),
                leaf => return Some(leaf),
            }
        }
        None
    }
}

// Probe errors are opaque, so two of them are equal only when they share the
// same allocation.
impl PartialEq for HealthError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HealthError::Probe(a), HealthError::Probe(b)) => Arc::ptr_eq(a, b),
            (HealthError::Cancelled, HealthError::Cancelled) => true,
            (HealthError::DeadlineExceeded(a), HealthError::DeadlineExceeded(b)) => a == b,
            (HealthError::Aggregate(a), HealthError::Aggregate(b)) => a == b,
            _ => false,
        }
    }
}

impl From<anyhow::Error> for HealthError {
    fn from(err: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = err.into();
        HealthError::Probe(Arc::from(boxed))
    }
}

impl From<std::io::Error> for HealthError {
    fn from(err: std::io::Error) -> Self {
        HealthError::probe(err)
    }
}
