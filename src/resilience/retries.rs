//! Optional bounds on the retry loop.
//!
//! # Responsibilities
//! - Cap the number of attempts per transaction
//! - Cap the total time spent on one transaction, including backoff
//!
//! Both bounds are off by default, which leaves the loop unbounded.

use std::time::Duration;

/// Limits applied to one transaction's retry loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryLimits {
    /// Maximum number of attempts, counting the first.
    pub max_attempts: Option<u32>,
    /// Maximum time from the first attempt until a retry would start.
    pub deadline: Option<Duration>,
}

impl RetryLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Reason to stop instead of retrying, if a limit would be crossed.
    ///
    /// `attempts` is the number of attempts already made and `elapsed` the
    /// time since the first one started.
    pub fn exhausted(&self, attempts: u32, elapsed: Duration, next_backoff: Duration) -> Option<String> {
        if let Some(max) = self.max_attempts {
            if attempts >= max {
                return Some(format!("retry limit reached after {} attempts", attempts));
            }
        }
        if let Some(deadline) = self.deadline {
            if elapsed.saturating_add(next_backoff) > deadline {
                return Some(format!(
                    "retry deadline of {}s would be exceeded after {} attempts",
                    deadline.as_secs(),
                    attempts
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_exhausts() {
        let limits = RetryLimits::unbounded();
        assert!(limits
            .exhausted(u32::MAX, Duration::from_secs(u64::MAX / 2), Duration::from_secs(60))
            .is_none());
    }

    #[test]
    fn test_max_attempts() {
        let limits = RetryLimits { max_attempts: Some(3), deadline: None };
        assert!(limits.exhausted(2, Duration::ZERO, Duration::from_secs(15)).is_none());
        let reason = limits.exhausted(3, Duration::ZERO, Duration::from_secs(15)).unwrap();
        assert!(reason.contains("3 attempts"));
    }

    #[test]
    fn test_deadline_counts_next_backoff() {
        let limits = RetryLimits { max_attempts: None, deadline: Some(Duration::from_secs(60)) };
        assert!(limits.exhausted(1, Duration::from_secs(30), Duration::from_secs(30)).is_none());
        assert!(limits.exhausted(1, Duration::from_secs(31), Duration::from_secs(30)).is_some());
    }
}
