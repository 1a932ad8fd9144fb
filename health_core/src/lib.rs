//! Concurrent health check aggregation.
//!
//! Checks implement [`HealthCheck`] and are combined either by
//! [`MultiHealthCheck`], which cancels the remaining checks on the first
//! failure, or by [`ServiceHealthCheck`], which runs every named service to
//! completion and records each outcome in a [`ServiceReport`].

pub mod config;
pub mod error;
pub mod health;

pub use config::HealthConfig;
pub use error::{HealthError, ProbeError, Result};
pub use health::{
    HealthCheck, HealthStatus, MultiHealthCheck, NopHealthCheck, ServiceHealthCheck,
    ServiceReport, ServiceStatus, TimeoutHealthCheck,
};

pub use tokio_util::sync::CancellationToken;
