use core::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EvolutionError};
use crate::vec2::Vec2;

/// Per-entry replacement probability, validated to lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
pub struct MutationRate(f64);

impl MutationRate {
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::MutationRateOutOfRange(rate));
        }
        Ok(Self(rate))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MutationRate {
    type Error = ConfigError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

/// Draws a force with uniform heading and magnitude in `[0, force_bound]`.
pub fn random_force<R: Rng + ?Sized>(force_bound: f64, rng: &mut R) -> Vec2 {
    let heading = rng.random_range(0.0..TAU);
    let magnitude = rng.random_range(0.0..=force_bound);
    Vec2::from_angle(heading, magnitude)
}

/// One force per tick of a rocket's life. A genome is never edited after it
/// is built; breeding always produces a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    forces: Vec<Vec2>,
}

impl Genome {
    pub fn random<R: Rng + ?Sized>(lifespan: usize, force_bound: f64, rng: &mut R) -> Self {
        let forces = (0..lifespan)
            .map(|_| random_force(force_bound, rng))
            .collect();
        Self { forces }
    }

    pub fn from_forces(forces: Vec<Vec2>) -> Self {
        Self { forces }
    }

    #[inline]
    pub fn forces(&self) -> &[Vec2] {
        &self.forces
    }

    #[inline]
    pub fn force_at(&self, index: usize) -> Option<Vec2> {
        self.forces.get(index).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Uniform crossover: every index independently takes its force from
    /// `self` or `other` on a fair coin flip.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Self,
        rng: &mut R,
    ) -> Result<Self, EvolutionError> {
        if self.len() != other.len() {
            return Err(EvolutionError::GenomeLengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }

        let forces = self
            .forces
            .iter()
            .zip(&other.forces)
            .map(|(a, b)| if rng.random_bool(0.5) { *a } else { *b })
            .collect();
        Ok(Self { forces })
    }

    /// Returns a copy where each force is redrawn with probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        rate: MutationRate,
        force_bound: f64,
        rng: &mut R,
    ) -> Self {
        let forces = self
            .forces
            .iter()
            .map(|force| {
                if rng.random::<f64>() < rate.get() {
                    random_force(force_bound, rng)
                } else {
                    *force
                }
            })
            .collect();
        Self { forces }
    }
}
