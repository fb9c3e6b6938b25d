use crate::runner::{run, write_report, RunOptions, RunReport};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use rockets_core::SimConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub config: SimConfig,
    pub seeds: Vec<u64>,
    pub generations: u32,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u64,
    pub seed_hex: String,
    pub generations_run: u32,
    pub solved_at: Option<u32>,
    pub fastest_arrival: Option<u32>,
    pub best_fitness: f64,
    pub final_mean_fitness: f64,
    pub report_path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub generations: u32,
    pub jobs: Option<usize>,
    pub population_size: usize,
    pub lifespan: u32,
    pub mutation_rate: f64,
    pub run_count: usize,
    pub solved_runs: usize,
    pub solve_rate: f64,
    /// Mean of `solved_at` over solved runs.
    pub avg_solved_at: Option<f64>,
    pub avg_best_fitness: f64,
    pub max_best_fitness: f64,
    /// Runs ordered best first: solved earliest, then highest fitness.
    pub runs: Vec<RunRecord>,
}

/// Runs one independent simulation per seed, in parallel, and ranks them.
/// Every run's full report lands in `out_dir/runs/`, the ranking in
/// `out_dir/summary.json`.
pub fn run_benchmark(bench: BenchmarkConfig) -> Result<BenchmarkReport> {
    if bench.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if bench.generations == 0 {
        return Err(anyhow!("benchmark requires generations > 0"));
    }
    if let Some(jobs) = bench.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    bench
        .config
        .validate()
        .context("benchmark config rejected by the simulation core")?;

    let runs_dir = bench.out_dir.join("runs");
    fs::create_dir_all(&runs_dir)
        .with_context(|| format!("failed creating {}", runs_dir.display()))?;

    let run_one = |seed: &u64| -> Result<RunRecord> {
        let config = SimConfig {
            seed: Some(*seed),
            ..bench.config.clone()
        };
        let report = run(
            config,
            RunOptions {
                generations: bench.generations,
                until_solved: false,
            },
        )
        .with_context(|| format!("benchmark run failed for seed={seed:#x}"))?;
        let path = runs_dir.join(format!("{}.json", seed_to_hex(*seed)));
        write_report(&path, &report)?;
        Ok(record_from(&report, path.display().to_string()))
    };

    let results: Vec<Result<RunRecord>> = if let Some(jobs) = bench.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| bench.seeds.par_iter().map(run_one).collect())
    } else {
        bench.seeds.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(results.len());
    for result in results {
        runs.push(result?);
    }
    runs.sort_by(|a, b| {
        let a_key = a.solved_at.unwrap_or(u32::MAX);
        let b_key = b.solved_at.unwrap_or(u32::MAX);
        a_key
            .cmp(&b_key)
            .then_with(|| b.best_fitness.total_cmp(&a.best_fitness))
            .then_with(|| a.seed.cmp(&b.seed))
    });

    let run_count = runs.len();
    let solved: Vec<u32> = runs.iter().filter_map(|r| r.solved_at).collect();
    let avg_solved_at = if solved.is_empty() {
        None
    } else {
        Some(solved.iter().map(|g| *g as f64).sum::<f64>() / solved.len() as f64)
    };
    let avg_best_fitness = runs.iter().map(|r| r.best_fitness).sum::<f64>() / run_count as f64;
    let max_best_fitness = runs.iter().map(|r| r.best_fitness).fold(0.0, f64::max);

    let report = BenchmarkReport {
        generated_unix_s: now_unix_s(),
        generations: bench.generations,
        jobs: bench.jobs,
        population_size: bench.config.population_size,
        lifespan: bench.config.lifespan,
        mutation_rate: bench.config.mutation_rate,
        run_count,
        solved_runs: solved.len(),
        solve_rate: solved.len() as f64 / run_count as f64,
        avg_solved_at,
        avg_best_fitness,
        max_best_fitness,
        runs,
    };

    write_report(&bench.out_dir.join("summary.json"), &report)?;
    Ok(report)
}

fn record_from(report: &RunReport, report_path: String) -> RunRecord {
    RunRecord {
        seed: report.seed,
        seed_hex: report.seed_hex.clone(),
        generations_run: report.generations_run,
        solved_at: report.solved_at,
        fastest_arrival: report.fastest_arrival,
        best_fitness: report.best_fitness_so_far,
        final_mean_fitness: report
            .history
            .last()
            .map(|s| s.mean_fitness)
            .unwrap_or_default(),
        report_path,
    }
}

fn now_unix_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
