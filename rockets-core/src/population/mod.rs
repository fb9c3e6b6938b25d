use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentStatus};
use crate::config::BreedingParams;
use crate::error::EvolutionError;
use crate::fitness::FitnessWeights;
use crate::genome::Genome;
use crate::world::World;

#[cfg(test)]
mod tests;

/// Where a generation is in its life. `Scoring` and `Breeding` are passed
/// through within a single `Simulation::tick`, so outside observers only see
/// them if they drive the population by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Running,
    Scoring,
    Breeding,
}

/// Statistics for one finished generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u32,
    pub ticks: u32,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub reached: usize,
    pub crashed: usize,
    pub expired: usize,
    /// Fastest arrival in this generation, if any rocket made it.
    pub fastest_arrival: Option<u32>,
    pub best_fitness_so_far: f64,
}

/// Fitness-proportionate parent picker. Falls back to a uniform pick when no
/// agent carries positive weight.
enum Selector {
    Weighted(WeightedIndex<f64>),
    Uniform(usize),
}

impl Selector {
    fn build(fitnesses: &[f64]) -> Result<Self, EvolutionError> {
        if fitnesses.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        let weights = fitnesses
            .iter()
            .map(|f| if f.is_finite() && *f > 0.0 { *f } else { 0.0 });
        Ok(match WeightedIndex::new(weights) {
            Ok(index) => Self::Weighted(index),
            Err(_) => Self::Uniform(fitnesses.len()),
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Self::Weighted(index) => index.sample(rng),
            Self::Uniform(len) => rng.random_range(0..*len),
        }
    }
}

/// The fixed-size set of rockets flying the current generation.
#[derive(Clone, Debug)]
pub struct Population {
    agents: Vec<Agent>,
    params: BreedingParams,
    generation: u32,
    phase: Phase,
    tick: u32,
}

impl Population {
    /// Generation 0: one random genome per slot, every agent on the pad.
    pub fn random<R: Rng + ?Sized>(params: BreedingParams, world: &World, rng: &mut R) -> Self {
        let agents = (0..params.population_size)
            .map(|_| {
                let genome = Genome::random(params.lifespan, params.force_bound, rng);
                Agent::new(genome, world.start, params.max_speed)
            })
            .collect();
        Self {
            agents,
            params,
            generation: 0,
            phase: Phase::Running,
            tick: 0,
        }
    }

    /// Steps every live agent once. Returns true when the generation has
    /// ended, at which point stragglers are expired and the phase is
    /// `Scoring`. Outside `Running` this does nothing.
    pub fn step_all(&mut self, world: &World) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        for agent in &mut self.agents {
            agent.step(world);
        }
        self.tick += 1;

        let all_done = self.agents.iter().all(|a| !a.status().is_alive());
        if all_done || self.tick as usize >= self.params.lifespan {
            for agent in &mut self.agents {
                agent.expire();
            }
            self.phase = Phase::Scoring;
            return true;
        }
        false
    }

    /// Ends the generation early: stragglers expire and the phase moves on
    /// to `Scoring`.
    pub fn force_finish(&mut self) {
        if self.phase == Phase::Running {
            for agent in &mut self.agents {
                agent.expire();
            }
            self.phase = Phase::Scoring;
        }
    }

    /// Scores every agent once and moves to `Breeding`. The returned summary
    /// has `best_fitness_so_far` set to this generation's best; the caller
    /// folds in its own running maximum.
    pub fn score(&mut self, world: &World, weights: &FitnessWeights) -> GenerationSummary {
        let mut total = 0.0;
        let mut best = 0.0f64;
        let mut reached = 0;
        let mut crashed = 0;
        let mut expired = 0;
        let mut fastest_arrival: Option<u32> = None;

        for agent in &mut self.agents {
            let fitness = agent.compute_fitness(world, weights);
            total += fitness;
            best = best.max(fitness);
            match agent.status() {
                AgentStatus::ReachedTarget => {
                    reached += 1;
                    let ticks = agent.ticks_used() as u32;
                    fastest_arrival = Some(fastest_arrival.map_or(ticks, |t| t.min(ticks)));
                }
                AgentStatus::Crashed => crashed += 1,
                AgentStatus::Expired | AgentStatus::Alive => expired += 1,
            }
        }

        self.phase = Phase::Breeding;
        let mean = if self.agents.is_empty() {
            0.0
        } else {
            total / self.agents.len() as f64
        };

        GenerationSummary {
            generation: self.generation,
            ticks: self.tick,
            best_fitness: best,
            mean_fitness: mean,
            reached,
            crashed,
            expired,
            fastest_arrival,
            best_fitness_so_far: best,
        }
    }

    /// Breeds the next generation from the scored one and resets the agents
    /// on the launch pad.
    ///
    /// With elitism the best genome is carried over unchanged; every other
    /// slot gets `mutate(crossover(p1, p2))` with both parents drawn by
    /// roulette selection, with replacement.
    pub fn breed<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        rng: &mut R,
    ) -> Result<(), EvolutionError> {
        let fitnesses: Vec<f64> = self
            .agents
            .iter()
            .map(|a| a.fitness().unwrap_or(0.0))
            .collect();
        let selector = Selector::build(&fitnesses)?;

        let size = self.params.population_size;
        let mut genomes = Vec::with_capacity(size);
        if self.params.elitism {
            if let Some(elite) = self.best_agent() {
                genomes.push(elite.genome().clone());
            }
        }

        while genomes.len() < size {
            let first = &self.agents[selector.sample(rng)];
            let second = &self.agents[selector.sample(rng)];
            let child = first.genome().crossover(second.genome(), rng)?.mutate(
                self.params.mutation_rate,
                self.params.force_bound,
                rng,
            );
            genomes.push(child);
        }

        self.agents = genomes
            .into_iter()
            .map(|genome| Agent::new(genome, world.start, self.params.max_speed))
            .collect();
        self.generation += 1;
        self.tick = 0;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Highest-scoring agent of the current generation, once scored.
    pub fn best_agent(&self) -> Option<&Agent> {
        self.agents
            .iter()
            .filter(|a| a.fitness().is_some())
            .max_by(|a, b| {
                let fa = a.fitness().unwrap_or(0.0);
                let fb = b.fitness().unwrap_or(0.0);
                fa.total_cmp(&fb)
            })
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.status().is_alive()).count()
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    #[inline]
    pub fn params(&self) -> &BreedingParams {
        &self.params
    }
}
