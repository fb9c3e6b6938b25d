use serde::{Deserialize, Serialize};

use crate::agent::AgentStatus;
use crate::constants::{
    DEFAULT_CRASH_PENALTY, DEFAULT_DISTANCE_WEIGHT, DEFAULT_REACH_BONUS, DEFAULT_TIME_BONUS,
    FITNESS_FLOOR,
};
use crate::error::ConfigError;

/// Tunable terms of the scoring function.
///
/// `validate` only admits weights for which a rocket that reached the target
/// outranks any rocket that did not at the same final distance, and an
/// earlier arrival strictly outranks a later one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Peak closeness score, earned at zero distance.
    pub distance_weight: f64,
    /// Flat bonus for touching the target at all.
    pub reach_bonus: f64,
    /// Extra bonus for arriving early, scaled by the unused share of the lifespan.
    pub time_bonus: f64,
    /// Multiplier in `(0, 1]` applied to crashed rockets.
    pub crash_penalty: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            distance_weight: DEFAULT_DISTANCE_WEIGHT,
            reach_bonus: DEFAULT_REACH_BONUS,
            time_bonus: DEFAULT_TIME_BONUS,
            crash_penalty: DEFAULT_CRASH_PENALTY,
        }
    }
}

impl FitnessWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.distance_weight.is_finite() && self.distance_weight >= 0.0) {
            return Err(ConfigError::InvalidFitnessWeights(
                "distance_weight must be finite and >= 0",
            ));
        }
        if !(self.reach_bonus.is_finite() && self.reach_bonus > FITNESS_FLOOR) {
            return Err(ConfigError::InvalidFitnessWeights(
                "reach_bonus must be finite and above the fitness floor",
            ));
        }
        if !(self.time_bonus.is_finite() && self.time_bonus > 0.0) {
            return Err(ConfigError::InvalidFitnessWeights(
                "time_bonus must be finite and > 0",
            ));
        }
        if !(self.crash_penalty > 0.0 && self.crash_penalty <= 1.0) {
            return Err(ConfigError::InvalidFitnessWeights(
                "crash_penalty must lie in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Scores one finished rocket.
    ///
    /// `reference_distance` is the launch-to-target distance; closeness decays
    /// as `reference / (reference + distance)` so the score keeps a gradient
    /// even for rockets that flew away from the target.
    pub fn score(
        &self,
        status: AgentStatus,
        final_distance: f64,
        ticks_used: usize,
        lifespan: usize,
        reference_distance: f64,
    ) -> f64 {
        let reference = reference_distance.max(1.0);
        let distance = final_distance.max(0.0);
        let mut fitness = self.distance_weight * reference / (reference + distance);

        match status {
            AgentStatus::ReachedTarget => {
                let lifespan = lifespan.max(1) as f64;
                let spare = lifespan - (ticks_used as f64).min(lifespan);
                fitness += self.reach_bonus + self.time_bonus * spare / lifespan;
            }
            AgentStatus::Crashed => fitness *= self.crash_penalty,
            AgentStatus::Expired | AgentStatus::Alive => {}
        }

        if fitness.is_finite() {
            fitness.max(FITNESS_FLOOR)
        } else {
            FITNESS_FLOOR
        }
    }
}
