//! Simulated network latency.

use rand::Rng;
use std::time::Duration;

pub const DEFAULT_LATENCY_MIN_MS: u64 = 200;
pub const DEFAULT_LATENCY_MAX_MS: u64 = 1200;

/// Uniform delay in `[min_ms, max_ms)` applied before every remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyPolicy {
    min_ms: u64,
    max_ms: u64,
}

impl LatencyPolicy {
    pub const fn uniform(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// No delay at all; used by tests and scripted runs.
    pub const fn none() -> Self {
        Self::uniform(0, 0)
    }

    pub fn bounds(&self) -> (u64, u64) {
        (self.min_ms, self.max_ms)
    }

    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let mut rng = rand::thread_rng();
        Duration::from_millis(rng.gen_range(self.min_ms..self.max_ms))
    }
}

impl Default for LatencyPolicy {
    fn default() -> Self {
        Self::uniform(DEFAULT_LATENCY_MIN_MS, DEFAULT_LATENCY_MAX_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::LatencyPolicy;
    use std::time::Duration;

    #[test]
    fn samples_stay_in_half_open_range() {
        let policy = LatencyPolicy::default();
        for _ in 0..500 {
            let sample = policy.sample();
            assert!(sample >= Duration::from_millis(200));
            assert!(sample < Duration::from_millis(1200));
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        assert_eq!(LatencyPolicy::none().sample(), Duration::ZERO);
        assert_eq!(
            LatencyPolicy::uniform(50, 10).sample(),
            Duration::from_millis(50)
        );
    }
}
