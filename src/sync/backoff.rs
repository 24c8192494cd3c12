//! Exponential backoff with a ceiling and no jitter.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    current_ms: u64,
}

impl Backoff {
    /// `max_ms` is raised to `base_ms` if it is smaller, so the current value
    /// never drops below base.
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms: max_ms.max(base_ms),
            current_ms: base_ms,
        }
    }

    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    pub fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    pub fn reset(&mut self) {
        self.current_ms = self.base_ms;
    }

    /// Double the delay after a failure, capped at max
    pub fn grow(&mut self) -> u64 {
        self.current_ms = self.current_ms.saturating_mul(2).min(self.max_ms);
        self.current_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_starts_at_base() {
        let b = Backoff::new(15_000, 60_000);
        assert_eq!(b.current_ms(), 15_000);
        assert_eq!(b.current(), Duration::from_secs(15));
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let mut b = Backoff::new(15_000, 60_000);
        assert_eq!(b.grow(), 30_000);
        assert_eq!(b.grow(), 60_000);
        // 120000 capped
        assert_eq!(b.grow(), 60_000);
        assert_eq!(b.grow(), 60_000);
    }

    #[test]
    fn test_backoff_matches_closed_form() {
        for n in 0..8u32 {
            let mut b = Backoff::new(1_000, 50_000);
            for _ in 0..n {
                b.grow();
            }
            assert_eq!(b.current_ms(), (1_000u64 * 2u64.pow(n)).min(50_000));
        }
    }

    #[test]
    fn test_backoff_reset_returns_to_base() {
        let mut b = Backoff::new(15_000, 60_000);
        b.grow();
        b.grow();
        b.reset();
        assert_eq!(b.current_ms(), 15_000);
    }

    #[test]
    fn test_max_below_base_is_raised() {
        let mut b = Backoff::new(10_000, 5_000);
        assert_eq!(b.max_ms(), 10_000);
        assert_eq!(b.grow(), 10_000);
    }
}
