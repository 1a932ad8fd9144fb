//! Per-service status report shared between a checker and its readers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};

use crate::error::HealthError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Outcome of the latest check of one service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<HealthError>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
    pub checked_at: DateTime<Utc>,
}

fn serialize_error<S: Serializer>(
    error: &Option<HealthError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

fn serialize_duration_ms<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl ServiceStatus {
    pub fn new(error: Option<HealthError>, duration: Duration) -> Self {
        Self {
            error,
            duration,
            checked_at: Utc::now(),
        }
    }

    pub fn status(&self) -> HealthStatus {
        match self.error {
            Some(_) => HealthStatus::Unhealthy,
            None => HealthStatus::Healthy,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Concurrency-safe map from service name to its latest status.
///
/// Cloning yields another handle to the same report.
#[derive(Debug, Clone, Default)]
pub struct ServiceReport {
    statuses: Arc<RwLock<HashMap<String, ServiceStatus>>>,
}

impl ServiceReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all statuses. Later checks never alter the returned map.
    pub fn statuses(&self) -> HashMap<String, ServiceStatus> {
        self.statuses.read().clone()
    }

    pub fn get(&self, name: &str) -> Option<ServiceStatus> {
        self.statuses.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.statuses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.read().is_empty()
    }

    /// `Unhealthy` if any recorded service is unhealthy. An empty report is
    /// healthy.
    pub fn overall_status(&self) -> HealthStatus {
        let statuses = self.statuses.read();
        if statuses.values().all(ServiceStatus::is_healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }

    /// True when both handles refer to the same report.
    pub fn ptr_eq(&self, other: &ServiceReport) -> bool {
        Arc::ptr_eq(&self.statuses, &other.statuses)
    }

    pub(crate) fn record(&self, name: &str, status: ServiceStatus) {
        self.statuses.write().insert(name.to_string(), status);
    }
}
