//! Action selection policies.
//!
//! The resource manager asks a policy, once per process per step, what that
//! process should do. Production runs use a seeded `RandomPolicy`; tests
//! drive the manager with a `ScriptedPolicy` to get exact sequences.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::process::{Choice, ProcessId};

/// Source of per-process actions.
pub trait ActionPolicy: Send {
    /// Pick the action for `process` this step. `None` leaves the process
    /// idle for the step.
    fn choose(&mut self, process: ProcessId, num_resources: usize) -> Option<Choice>;
}

/// Coin-flip between request and release on a uniformly chosen resource type.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
    request_probability: f64,
}

impl RandomPolicy {
    /// Reproducible policy; the same seed yields the same action sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            request_probability: 0.5,
        }
    }

    /// Policy seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            request_probability: 0.5,
        }
    }

    /// Bias the coin toward requests. Values are clamped to `[0, 1]`; NaN
    /// keeps the even coin flip.
    pub fn with_request_probability(mut self, probability: f64) -> Self {
        self.request_probability = if probability.is_nan() {
            0.5
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }
}

impl ActionPolicy for RandomPolicy {
    fn choose(&mut self, _process: ProcessId, num_resources: usize) -> Option<Choice> {
        if num_resources == 0 {
            return None;
        }
        let resource = self.rng.gen_range(0..num_resources);
        if self.rng.gen_bool(self.request_probability) {
            Some(Choice::request(resource))
        } else {
            Some(Choice::release(resource))
        }
    }
}

/// Replays a fixed list of choices in order, then leaves every process idle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    script: VecDeque<Option<Choice>>,
}

impl ScriptedPolicy {
    pub fn new(script: impl IntoIterator<Item = Option<Choice>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Choices still queued.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ActionPolicy for ScriptedPolicy {
    fn choose(&mut self, _process: ProcessId, _num_resources: usize) -> Option<Choice> {
        self.script.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Action;

    #[test]
    fn test_seeded_policy_is_reproducible() {
        let mut a = RandomPolicy::seeded(42);
        let mut b = RandomPolicy::seeded(42);

        let run_a: Vec<_> = (0..50).map(|p| a.choose(p % 5, 3)).collect();
        let run_b: Vec<_> = (0..50).map(|p| b.choose(p % 5, 3)).collect();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_random_choices_stay_in_range() {
        let mut policy = RandomPolicy::seeded(7);
        for p in 0..200 {
            let choice = policy.choose(p, 4).unwrap();
            assert!(choice.resource < 4);
        }
        assert_eq!(policy.choose(0, 0), None);
    }

    #[test]
    fn test_request_probability_extremes() {
        let mut always = RandomPolicy::seeded(1).with_request_probability(1.0);
        let mut never = RandomPolicy::seeded(1).with_request_probability(-3.0);

        for p in 0..20 {
            assert_eq!(always.choose(p, 2).unwrap().action, Action::Request);
            assert_eq!(never.choose(p, 2).unwrap().action, Action::Release);
        }
    }

    #[test]
    fn test_nan_request_probability_falls_back_to_coin_flip() {
        let mut policy = RandomPolicy::seeded(1).with_request_probability(f64::NAN);
        let mut even = RandomPolicy::seeded(1);

        for p in 0..20 {
            let choice = policy.choose(p, 2);
            assert!(choice.is_some());
            assert_eq!(choice, even.choose(p, 2));
        }
    }

    #[test]
    fn test_scripted_policy_replays_then_idles() {
        let mut policy = ScriptedPolicy::new([
            Some(Choice::request(1)),
            None,
            Some(Choice::release(0)),
        ]);

        assert_eq!(policy.choose(0, 2), Some(Choice::request(1)));
        assert_eq!(policy.choose(1, 2), None);
        assert_eq!(policy.remaining(), 1);
        assert_eq!(policy.choose(2, 2), Some(Choice::release(0)));
        assert_eq!(policy.choose(0, 2), None);
    }
}
