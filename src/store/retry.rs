use std::time::Duration;

/// Backoff schedule for transient store failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// The pause after `completed_attempts` failed attempts:
    /// `initial_delay * backoff_multiplier^(completed_attempts - 1)`.
    pub fn delay_before_retry(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.saturating_sub(1);
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(exponent as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::RetryConfig;
    use std::time::Duration;

    #[test]
    fn the_default_schedule_waits_one_then_two_seconds() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_before_retry(1), Duration::from_millis(1000));
        assert_eq!(config.delay_before_retry(2), Duration::from_millis(2000));
    }

    #[test]
    fn the_delay_grows_multiplicatively() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 3.0,
        };
        assert_eq!(config.delay_before_retry(1), Duration::from_millis(100));
        assert_eq!(config.delay_before_retry(2), Duration::from_millis(300));
        assert_eq!(config.delay_before_retry(3), Duration::from_millis(900));
    }
}
