//! Applier configuration and retry policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage bucket that serves KG-Hub downloads
pub const DEFAULT_BUCKET: &str = "kg-hub-public-data";

/// Applier configuration
///
/// Dry run is the default; writes require turning it off explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplierConfig {
    /// Target storage namespace
    pub bucket: String,
    /// Compute and print only
    pub dry_run: bool,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
    /// Retries after the first attempt
    pub retry_budget: u32,
    /// Base backoff between retries in milliseconds
    pub backoff_ms: u64,
}

impl ApplierConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With bucket
    #[inline]
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// With dry run flag
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With per-call timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// With retry budget
    #[inline]
    #[must_use]
    pub fn with_retry_budget(mut self, retries: u32) -> Self {
        self.retry_budget = retries;
        self
    }

    /// Per-call timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Retry policy derived from budget and backoff
    #[inline]
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_budget.saturating_add(1),
            base_backoff_ms: self.backoff_ms,
        }
    }
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            dry_run: true,
            timeout_seconds: 30,
            retry_budget: 2,
            backoff_ms: 500,
        }
    }
}

/// Bounded retry with linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `n` units
    pub base_backoff_ms: u64,
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt`
    #[inline]
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_safe() {
        let config = ApplierConfig::default();
        assert!(config.dry_run);
        assert_eq!(config.bucket, "kg-hub-public-data");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_policy().max_attempts, 3);
    }

    #[test]
    fn backoff_grows_linearly() {
        let policy = ApplierConfig::new().retry_policy();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1000));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ApplierConfig = serde_json::from_str(r#"{"bucket": "staging", "retry_budget": 0}"#).unwrap();
        assert_eq!(config.bucket, "staging");
        assert_eq!(config.retry_policy().max_attempts, 1);
        assert!(config.dry_run);
    }
}
