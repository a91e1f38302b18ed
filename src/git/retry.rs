//! Retry policy for remote clones

use crate::config::CloneSettings;
use crate::error::CloneFailure;
use std::time::Duration;

/// How many times a clone is attempted and how long to wait in between
///
/// The delay doubles after every failed attempt: with a base of 2 seconds the
/// waits are 2s, 4s, 8s and so on.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    retryable: fn(&CloneFailure) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&CloneSettings::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retryable: CloneFailure::is_transient,
        }
    }

    pub fn from_settings(settings: &CloneSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.backoff_base_secs),
        )
    }

    /// Replace the predicate deciding which failures are worth another attempt
    pub fn with_predicate(mut self, retryable: fn(&CloneFailure) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Wait before the attempt following `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Whether a failed `attempt` should be followed by another one
    pub fn should_retry(&self, attempt: u32, failure: &CloneFailure) -> bool {
        attempt < self.max_attempts && (self.retryable)(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn test_should_retry_respects_budget_and_kind() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.should_retry(1, &CloneFailure::ConnectionReset));
        assert!(policy.should_retry(2, &CloneFailure::Timeout));
        assert!(!policy.should_retry(3, &CloneFailure::Timeout));
        assert!(!policy.should_retry(1, &CloneFailure::NotFound));
        assert!(!policy.should_retry(1, &CloneFailure::AuthFailed));
    }

    #[test]
    fn test_custom_predicate() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10)).with_predicate(|_| false);
        assert!(!policy.should_retry(1, &CloneFailure::NetworkError));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
    }
}
