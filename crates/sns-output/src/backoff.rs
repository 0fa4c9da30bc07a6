//! Retry delays for throttled topic discovery.

use std::time::Duration;

/// Delays in seconds for attempts 1 through 5.
pub const DEFAULT_DELAYS_SECS: [u64; 5] = [1, 10, 60, 300, 600];

/// Fixed attempt → delay table. Attempts past the end of the table have no
/// delay, which means give up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    delays: Vec<Duration>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_secs(&DEFAULT_DELAYS_SECS)
    }
}

impl BackoffPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_secs(secs: &[u64]) -> Self {
        Self::new(secs.iter().copied().map(Duration::from_secs).collect())
    }

    /// Delay before retrying after the given 1-based attempt failed.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        let index = usize::try_from(attempt).ok()?.checked_sub(1)?;
        self.delays.get(index).copied()
    }

    /// Number of attempts that have a delay defined.
    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let policy = BackoffPolicy::default();
        let delays: Vec<u64> = (1..=5)
            .map(|attempt| policy.delay_for(attempt).unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![1, 10, 60, 300, 600]);
    }

    #[test]
    fn test_undefined_outside_table() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(0), None);
        assert_eq!(policy.delay_for(6), None);
        assert_eq!(policy.delay_for(u32::MAX), None);
        assert_eq!(policy.max_retries(), 5);
    }

    #[test]
    fn test_empty_table_never_retries() {
        let policy = BackoffPolicy::new(Vec::new());
        assert_eq!(policy.delay_for(1), None);
    }
}
