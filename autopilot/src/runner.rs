use anyhow::{anyhow, Context, Result};
use rockets_core::{GenerationSummary, SimConfig, Simulation, Snapshot};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::util::seed_to_hex;

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub generations: u32,
    /// Stop after the first generation in which a rocket reached the target.
    pub until_solved: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub seed_hex: String,
    pub population_size: usize,
    pub lifespan: u32,
    pub mutation_rate: f64,
    pub generations_run: u32,
    /// First generation with at least one rocket on target.
    pub solved_at: Option<u32>,
    pub fastest_arrival: Option<u32>,
    pub best_fitness_so_far: f64,
    pub history: Vec<GenerationSummary>,
    pub final_snapshot: Snapshot,
}

/// Drives one simulation headlessly for up to `options.generations`
/// generations.
pub fn run(config: SimConfig, options: RunOptions) -> Result<RunReport> {
    if options.generations == 0 {
        return Err(anyhow!("generations must be > 0"));
    }

    let mut sim = Simulation::new(config).context("failed creating simulation")?;
    let mut solved_at = None;

    for _ in 0..options.generations {
        let summary = sim
            .run_generation()
            .with_context(|| format!("generation {} failed to breed", sim.generation()))?;
        if summary.reached > 0 && solved_at.is_none() {
            solved_at = Some(summary.generation);
            tracing::info!(
                generation = summary.generation,
                fastest = ?summary.fastest_arrival,
                "target reached"
            );
        }
        if options.until_solved && solved_at.is_some() {
            break;
        }
    }

    let history = sim.history().to_vec();
    let fastest_arrival = history.iter().filter_map(|s| s.fastest_arrival).min();
    let config = sim.config();

    Ok(RunReport {
        seed: sim.seed(),
        seed_hex: seed_to_hex(sim.seed()),
        population_size: config.population_size,
        lifespan: config.lifespan,
        mutation_rate: config.mutation_rate,
        generations_run: history.len() as u32,
        solved_at,
        fastest_arrival,
        best_fitness_so_far: sim.best_fitness_so_far(),
        history,
        final_snapshot: sim.snapshot(),
    })
}

pub fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(report)?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}
