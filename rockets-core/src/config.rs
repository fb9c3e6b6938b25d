use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FORCE_BOUND, DEFAULT_LIFESPAN, DEFAULT_MUTATION_RATE, DEFAULT_POPULATION_SIZE,
    DEFAULT_START_X, DEFAULT_START_Y,
};
use crate::error::ConfigError;
use crate::fitness::FitnessWeights;
use crate::genome::MutationRate;
use crate::vec2::Vec2;
use crate::world::{Bounds, Obstacle, Target, World};

/// Everything `Simulation::restart` needs.
///
/// Field names are snake_case; the camelCase spellings and the key names of
/// the legacy `config.json` (`population`, `start_pos`, `goal`,
/// `win_size`) are accepted as aliases. `bounds` is fixed for the lifetime
/// of a simulation and is ignored on restart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    #[serde(alias = "population", alias = "populationSize")]
    pub population_size: usize,
    pub lifespan: u32,
    #[serde(alias = "mutationRate")]
    pub mutation_rate: f64,
    #[serde(alias = "forceMagnitudeBound", alias = "forceBound")]
    pub force_bound: f64,
    #[serde(alias = "goal")]
    pub target: Target,
    pub obstacles: Vec<Obstacle>,
    #[serde(alias = "start_pos", alias = "startPosition")]
    pub start_position: Vec2,
    #[serde(alias = "win_size", alias = "spatialBounds")]
    pub bounds: Bounds,
    pub elitism: bool,
    #[serde(alias = "maxSpeed")]
    pub max_speed: Option<f64>,
    pub seed: Option<u64>,
    pub fitness: FitnessWeights,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            lifespan: DEFAULT_LIFESPAN,
            mutation_rate: DEFAULT_MUTATION_RATE,
            force_bound: DEFAULT_FORCE_BOUND,
            target: Target::default(),
            obstacles: Vec::new(),
            start_position: Vec2::new(DEFAULT_START_X, DEFAULT_START_Y),
            bounds: Bounds::default(),
            elitism: true,
            max_speed: None,
            seed: None,
            fitness: FitnessWeights::default(),
        }
    }
}

/// Validated subset of `SimConfig` that drives breeding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreedingParams {
    pub population_size: usize,
    pub lifespan: usize,
    pub mutation_rate: MutationRate,
    pub force_bound: f64,
    pub elitism: bool,
    pub max_speed: Option<f64>,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.breeding_params()?;
        self.fitness.validate()?;
        self.world().validate()
    }

    pub fn breeding_params(&self) -> Result<BreedingParams, ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.lifespan == 0 {
            return Err(ConfigError::ZeroLifespan);
        }
        let mutation_rate = MutationRate::new(self.mutation_rate)?;
        if !(self.force_bound.is_finite() && self.force_bound > 0.0) {
            return Err(ConfigError::InvalidForceBound(self.force_bound));
        }
        if let Some(max_speed) = self.max_speed {
            if !(max_speed.is_finite() && max_speed > 0.0) {
                return Err(ConfigError::InvalidMaxSpeed(max_speed));
            }
        }

        Ok(BreedingParams {
            population_size: self.population_size,
            lifespan: self.lifespan as usize,
            mutation_rate,
            force_bound: self.force_bound,
            elitism: self.elitism,
            max_speed: self.max_speed,
        })
    }

    pub fn world(&self) -> World {
        World {
            target: self.target,
            obstacles: self.obstacles.clone(),
            bounds: self.bounds,
            start: self.start_position,
        }
    }
}
