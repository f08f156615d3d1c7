//! Reconnection Backoff Policy
//!
//! Computes the delay between reconnection attempts: a fixed per-attempt
//! step, capped at a maximum. The supervisor owns the attempt counter (it
//! is never reset while the process lives), so the policy itself is
//! stateless.

use std::time::Duration;

use crate::infrastructure::config::BackoffSettings;

/// Backoff schedule: `delay(n) = min(max_delay, step × n)`.
///
/// The delay grows linearly with the attempt number and never decreases
/// while uncapped, so repeated failures spread retries out without ever
/// exceeding the cap.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    step: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Create a policy from backoff settings.
    #[must_use]
    pub const fn new(settings: &BackoffSettings) -> Self {
        Self {
            step: settings.step,
            max_delay: settings.max_delay,
        }
    }

    /// Delay to sleep before retrying after the given attempt number.
    ///
    /// Attempt numbers start at 1 (the first connection attempt).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(&BackoffSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, 2; "first attempt waits one step")]
    #[test_case(2, 4; "second attempt waits two steps")]
    #[test_case(5, 10; "fifth attempt waits five steps")]
    #[test_case(14, 28; "fourteenth attempt is below the cap")]
    #[test_case(15, 30; "fifteenth attempt reaches the cap")]
    #[test_case(16, 30; "subsequent attempts stay capped")]
    #[test_case(1_000, 30; "far later attempts stay capped")]
    fn default_schedule(attempt: u32, expected_secs: u64) {
        let policy = BackoffPolicy::default();
        assert_eq!(
            policy.delay_for_attempt(attempt),
            Duration::from_secs(expected_secs)
        );
    }

    #[test]
    fn delay_is_monotone_until_capped() {
        let policy = BackoffPolicy::default();
        let mut previous = Duration::ZERO;

        for attempt in 1..=100 {
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay >= previous, "delay regressed at attempt {attempt}");
            assert!(delay <= Duration::from_secs(30));
            previous = delay;
        }
    }

    #[test]
    fn custom_settings_are_honored() {
        let policy = BackoffPolicy::new(&BackoffSettings {
            step: Duration::from_millis(10),
            max_delay: Duration::from_millis(35),
        });

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(30));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(35));
    }
}
