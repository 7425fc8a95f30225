//! Configuration for lwm2m-bridge
//!
//! Centralized configuration with sensible defaults.

use crate::error::{BridgeError, Result};

/// Main configuration for a response translation session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Observation Configuration
    // -------------------------------------------------------------------------
    /// What the session does when an observe succeeded on the device but the
    /// observation could not be registered
    pub registration_failure: RegistrationFailurePolicy,

    /// Upper bound on live observations held by the in-memory registry
    /// (`None` = unbounded)
    pub max_observations: Option<usize>,

    // -------------------------------------------------------------------------
    // Content Configuration
    // -------------------------------------------------------------------------
    /// Largest payload handed to the decoder (in bytes)
    pub max_payload_size: usize,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

/// Policy applied when observation registration fails after a successful observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationFailurePolicy {
    /// Surface the registration error to the caller
    Fail,

    /// Log a warning and return the already-built response
    Degrade,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registration_failure: RegistrationFailurePolicy::Fail,
            max_observations: None,
            max_payload_size: 1024 * 1024, // 1 MB
            log_filter: "info,lwm2m_bridge=debug".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values no session can work with
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size == 0 {
            return Err(BridgeError::Config(
                "max_payload_size must be greater than zero".to_string(),
            ));
        }
        if self.max_observations == Some(0) {
            return Err(BridgeError::Config(
                "max_observations must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the registration failure policy
    pub fn registration_failure(mut self, policy: RegistrationFailurePolicy) -> Self {
        self.config.registration_failure = policy;
        self
    }

    /// Cap the number of live observations
    pub fn max_observations(mut self, count: usize) -> Self {
        self.config.max_observations = Some(count);
        self
    }

    /// Set the maximum decoded payload size (in bytes)
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the default log filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
