//! Fault-injection policies for the simulated remote.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Decides whether the next mutating call fails.
pub trait FaultPolicy: Send + Sync {
    fn should_fail(&self) -> bool;
}

/// Independent failure with a fixed probability.
pub struct RandomFaults {
    rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomFaults {
    /// `rate` is clamped into `[0, 1]`.
    pub fn new(rate: f64) -> Self {
        Self::with_rng(rate, StdRng::from_entropy())
    }

    /// Reproducible fault sequence for a given seed.
    pub fn seeded(rate: f64, seed: u64) -> Self {
        Self::with_rng(rate, StdRng::seed_from_u64(seed))
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn with_rng(rate: f64, rng: StdRng) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        Self {
            rate,
            rng: Mutex::new(rng),
        }
    }
}

impl FaultPolicy for RandomFaults {
    fn should_fail(&self) -> bool {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_bool(self.rate)
    }
}

pub struct NeverFail;

impl FaultPolicy for NeverFail {
    fn should_fail(&self) -> bool {
        false
    }
}

pub struct AlwaysFail;

impl FaultPolicy for AlwaysFail {
    fn should_fail(&self) -> bool {
        true
    }
}

/// Replays queued outcomes in order, then succeeds once the queue is empty.
#[derive(Default)]
pub struct ScriptedFaults {
    outcomes: Mutex<VecDeque<bool>>,
}

impl ScriptedFaults {
    pub fn new<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    pub fn push(&self, fail: bool) {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(fail);
    }
}

impl FaultPolicy for ScriptedFaults {
    fn should_fail(&self) -> bool {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::{AlwaysFail, FaultPolicy, NeverFail, RandomFaults, ScriptedFaults};

    #[test]
    fn seeded_faults_are_reproducible() {
        let first = RandomFaults::seeded(0.5, 42);
        let second = RandomFaults::seeded(0.5, 42);
        let a: Vec<bool> = (0..64).map(|_| first.should_fail()).collect();
        let b: Vec<bool> = (0..64).map(|_| second.should_fail()).collect();
        assert_eq!(a, b);
        assert!(a.iter().any(|fail| *fail));
        assert!(a.iter().any(|fail| !*fail));
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(RandomFaults::new(3.0).rate(), 1.0);
        assert_eq!(RandomFaults::new(-1.0).rate(), 0.0);
        assert!(RandomFaults::new(1.0).should_fail());
        assert!(!RandomFaults::new(0.0).should_fail());
    }

    #[test]
    fn scripted_faults_replay_then_succeed() {
        let faults = ScriptedFaults::new([true, false]);
        faults.push(true);
        assert!(faults.should_fail());
        assert!(!faults.should_fail());
        assert!(faults.should_fail());
        assert!(!faults.should_fail());
        assert!(AlwaysFail.should_fail());
        assert!(!NeverFail.should_fail());
    }
}
