//! Timeout configuration for fetch operations.

use std::time::Duration;

/// Deadline for one fetch, covering connect, request and body.
///
/// Connection setup is bounded separately by the transport, since one
/// connection pool serves every dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Total operation timeout, including reading the body.
    pub total: Duration,
}

impl TimeoutConfig {
    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self { total }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_total() {
        assert_eq!(TimeoutConfig::default().total, Duration::from_secs(5));
        assert_eq!(
            TimeoutConfig::from_total(Duration::from_millis(2_000)).total,
            Duration::from_millis(2_000)
        );
    }
}
