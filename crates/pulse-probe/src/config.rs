//! Probe configuration and validation.
//!
//! Configuration is validated once, at `build()`. Invalid values fail fast
//! with a descriptive error before any scheduling starts.

use std::time::Duration;

use thiserror::Error;

use crate::performer::Performer;

/// Errors raised when building an invalid [`ProbeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("period must be a positive duration")]
    ZeroPeriod,

    #[error("timeout must be a positive duration")]
    ZeroTimeout,

    #[error("success_threshold must be a positive integer")]
    ZeroSuccessThreshold,

    #[error("failure_threshold must be a positive integer")]
    ZeroFailureThreshold,
}

/// Validated, immutable probe configuration.
///
/// Built via [`ProbeConfig::builder`]; the performer is the only required
/// field. Defaults mirror orchestrator probe defaults: no initial delay,
/// 10s period, 1s timeout, 1 success / 3 failures to transition.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub(crate) performer: Performer,
    pub(crate) initial_delay: Duration,
    pub(crate) period: Duration,
    pub(crate) timeout: Duration,
    pub(crate) success_threshold: u32,
    pub(crate) failure_threshold: u32,
}

impl ProbeConfig {
    /// Start building a config around the given performer.
    pub fn builder(performer: Performer) -> ProbeConfigBuilder {
        ProbeConfigBuilder {
            performer,
            initial_delay: Duration::ZERO,
            period: Duration::from_secs(10),
            timeout: Duration::from_secs(1),
            success_threshold: 1,
            failure_threshold: 3,
        }
    }

    /// One-time delay before the first check of a session.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Minimum spacing between check starts.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timeout budget per check attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Consecutive passes required to emit `healthy`.
    pub fn success_threshold(&self) -> u32 {
        self.success_threshold
    }

    /// Consecutive failures required to emit `unhealthy`.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }
}

/// Builder for [`ProbeConfig`].
#[derive(Debug, Clone)]
pub struct ProbeConfigBuilder {
    performer: Performer,
    initial_delay: Duration,
    period: Duration,
    timeout: Duration,
    success_threshold: u32,
    failure_threshold: u32,
}

impl ProbeConfigBuilder {
    /// One-time delay before the first check. Default: zero.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Check period. Must be positive. Default: 10s.
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Per-attempt timeout budget. Must be positive. Default: 1s.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Consecutive passes before `healthy`. Must be >= 1. Default: 1.
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Consecutive failures before `unhealthy`. Must be >= 1. Default: 3.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<ProbeConfig, ConfigError> {
        if self.period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.success_threshold == 0 {
            return Err(ConfigError::ZeroSuccessThreshold);
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::ZeroFailureThreshold);
        }

        Ok(ProbeConfig {
            performer: self.performer,
            initial_delay: self.initial_delay,
            period: self.period,
            timeout: self.timeout,
            success_threshold: self.success_threshold,
            failure_threshold: self.failure_threshold,
        })
    }
}
