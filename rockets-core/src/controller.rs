use serde::Serialize;

use crate::agent::AgentStatus;
use crate::config::SimConfig;
use crate::constants::{DEFAULT_SPEED, MAX_SPEED, MIN_SPEED, SPEED_STEP};
use crate::error::{ConfigError, EvolutionError};
use crate::fitness::FitnessWeights;
use crate::population::{GenerationSummary, Phase, Population};
use crate::rng::SimRng;
use crate::vec2::Vec2;
use crate::world::{Target, World};

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Running,
    GenerationComplete(GenerationSummary),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub position: Vec2,
    pub status: AgentStatus,
    pub fitness: Option<f64>,
    pub genome_index: usize,
}

/// Read-only view for renderers and HUDs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: u32,
    pub tick: u32,
    pub lifespan: u32,
    pub phase: Phase,
    pub speed: u32,
    pub alive: usize,
    pub target: Target,
    /// Best score the current agents would get if the generation ended now.
    pub current_best_fitness: f64,
    pub best_fitness_so_far: f64,
    pub agents: Vec<AgentSnapshot>,
}

/// Owns one smart-rockets run: the world, the population and the random
/// stream. The presentation layer holds a single `Simulation` and drives it
/// through `tick`, `set_speed`, `restart` and `relocate_target`.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimConfig,
    world: World,
    weights: FitnessWeights,
    population: Population,
    rng: SimRng,
    speed: u32,
    best_fitness_so_far: f64,
    history: Vec<GenerationSummary>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let params = config.breeding_params()?;
        let world = config.world();
        let mut rng = config.seed.map_or_else(SimRng::from_entropy, SimRng::new);
        let population = Population::random(params, &world, &mut rng);

        tracing::info!(
            population = params.population_size,
            lifespan = params.lifespan,
            seed = rng.seed(),
            "simulation created"
        );

        Ok(Self {
            weights: config.fitness,
            config,
            world,
            population,
            rng,
            speed: DEFAULT_SPEED,
            best_fitness_so_far: 0.0,
            history: Vec::new(),
        })
    }

    /// Advances the simulation by exactly one tick. When the tick ends the
    /// generation, scoring and breeding happen before this returns.
    pub fn tick(&mut self) -> Result<TickOutcome, EvolutionError> {
        if !self.population.step_all(&self.world) {
            tracing::trace!(
                generation = self.population.generation(),
                tick = self.population.tick(),
                alive = self.population.alive_count(),
                "tick"
            );
            return Ok(TickOutcome::Running);
        }
        self.finish_generation().map(TickOutcome::GenerationComplete)
    }

    /// Runs `speed` ticks, as one presentation frame would, and returns the
    /// summaries of any generations that completed along the way.
    pub fn advance_frame(&mut self) -> Result<Vec<GenerationSummary>, EvolutionError> {
        let mut completed = Vec::new();
        for _ in 0..self.speed {
            if let TickOutcome::GenerationComplete(summary) = self.tick()? {
                completed.push(summary);
            }
        }
        Ok(completed)
    }

    /// Ticks until the current generation turns over.
    pub fn run_generation(&mut self) -> Result<GenerationSummary, EvolutionError> {
        loop {
            if let TickOutcome::GenerationComplete(summary) = self.tick()? {
                return Ok(summary);
            }
        }
    }

    /// Ends the current generation immediately and breeds the next one.
    pub fn end_generation(&mut self) -> Result<GenerationSummary, EvolutionError> {
        self.population.force_finish();
        self.finish_generation()
    }

    fn finish_generation(&mut self) -> Result<GenerationSummary, EvolutionError> {
        let mut summary = self.population.score(&self.world, &self.weights);
        self.best_fitness_so_far = self.best_fitness_so_far.max(summary.best_fitness);
        summary.best_fitness_so_far = self.best_fitness_so_far;

        self.population.breed(&self.world, &mut self.rng)?;

        tracing::info!(
            generation = summary.generation,
            ticks = summary.ticks,
            reached = summary.reached,
            crashed = summary.crashed,
            expired = summary.expired,
            "generation complete: best={:.2} mean={:.2} best_so_far={:.2}",
            summary.best_fitness,
            summary.mean_fitness,
            summary.best_fitness_so_far
        );
        self.history.push(summary.clone());
        Ok(summary)
    }

    /// Sets ticks per presentation frame, clamped to the supported range.
    /// Returns the speed actually applied.
    pub fn set_speed(&mut self, multiplier: u32) -> u32 {
        self.speed = multiplier.clamp(MIN_SPEED, MAX_SPEED);
        self.speed
    }

    pub fn speed_up(&mut self) -> u32 {
        self.set_speed(self.speed.saturating_add(SPEED_STEP))
    }

    pub fn slow_down(&mut self) -> u32 {
        self.set_speed(self.speed.saturating_sub(SPEED_STEP))
    }

    #[inline]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Throws away the current population and starts again from generation
    /// 0 with fresh random genomes. Bounds cannot change while a simulation
    /// lives; a config with different bounds keeps the current ones.
    pub fn restart(&mut self, mut config: SimConfig) -> Result<(), ConfigError> {
        if config.bounds != self.world.bounds {
            tracing::warn!(
                "bounds are not hot-reloadable: keeping {}x{}, ignoring {}x{}",
                self.world.bounds.width,
                self.world.bounds.height,
                config.bounds.width,
                config.bounds.height
            );
            config.bounds = self.world.bounds;
        }
        config.validate()?;
        let params = config.breeding_params()?;

        if let Some(seed) = config.seed {
            self.rng = SimRng::new(seed);
        }
        self.world = config.world();
        self.weights = config.fitness;
        self.population = Population::random(params, &self.world, &mut self.rng);
        self.best_fitness_so_far = 0.0;
        self.history.clear();
        self.config = config;

        tracing::info!(
            population = params.population_size,
            lifespan = params.lifespan,
            seed = self.rng.seed(),
            "simulation restarted"
        );
        Ok(())
    }

    /// Moves the target. Takes effect on the next tick; the running
    /// generation carries on. A non-finite point is rejected and the target
    /// stays where it was.
    pub fn relocate_target(&mut self, point: Vec2) -> Result<(), ConfigError> {
        if !point.is_finite() {
            return Err(ConfigError::NonFinitePoint {
                field: "target.point",
            });
        }
        tracing::debug!(x = point.x, y = point.y, "target relocated");
        self.world.target.point = point;
        self.config.target.point = point;
        Ok(())
    }

    /// True once any rocket of the current generation has hit the target.
    pub fn found_solution(&self) -> bool {
        self.population
            .agents()
            .iter()
            .any(|a| a.status() == AgentStatus::ReachedTarget)
    }

    pub fn snapshot(&self) -> Snapshot {
        let agents = self
            .population
            .agents()
            .iter()
            .map(|a| AgentSnapshot {
                position: a.position(),
                status: a.status(),
                fitness: a.fitness(),
                genome_index: a.genome_index(),
            })
            .collect();
        let current_best_fitness = self
            .population
            .agents()
            .iter()
            .map(|a| a.provisional_fitness(&self.world, &self.weights))
            .fold(0.0, f64::max);

        Snapshot {
            generation: self.population.generation(),
            tick: self.population.tick(),
            lifespan: self.config.lifespan,
            phase: self.population.phase(),
            speed: self.speed,
            alive: self.population.alive_count(),
            target: self.world.target,
            current_best_fitness,
            best_fitness_so_far: self.best_fitness_so_far,
            agents,
        }
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.population.generation()
    }

    #[inline]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    #[inline]
    pub fn best_fitness_so_far(&self) -> f64 {
        self.best_fitness_so_far
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}
