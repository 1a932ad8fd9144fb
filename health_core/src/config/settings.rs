use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::health::{HealthCheck, TimeoutHealthCheck};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthConfig {
    /// Per-check deadline applied by `apply_timeout`. `None` leaves
    /// cancellation entirely to the caller's token.
    pub check_timeout_ms: Option<u64>,
    pub slow_check_threshold_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout_ms: None,
            slow_check_threshold_ms: 1000,
        }
    }
}

impl HealthConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("health.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut builder = Config::builder()
            .add_source(Config::try_from(&HealthConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("HEALTH")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let health_config: HealthConfig = config.try_deserialize()?;

        health_config.validate()?;

        Ok(health_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_timeout_ms == Some(0) {
            return Err(ConfigError::Message(
                "Check timeout must be greater than 0 when set".to_string(),
            ));
        }

        if self.slow_check_threshold_ms == 0 {
            return Err(ConfigError::Message(
                "Slow check threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }

    pub fn slow_check_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_check_threshold_ms)
    }

    /// Wraps `check` in a deadline when one is configured.
    pub fn apply_timeout<C>(&self, check: C) -> Box<dyn HealthCheck>
    where
        C: HealthCheck + 'static,
    {
        match self.check_timeout() {
            Some(timeout) => Box::new(TimeoutHealthCheck::new(check, timeout)),
            None => Box::new(check),
        }
    }
}
