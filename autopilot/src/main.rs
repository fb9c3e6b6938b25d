use anyhow::Result;
use clap::{Parser, Subcommand};
use rockets_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use rockets_autopilot::config::{load_config, log_filter, ENV_LOG};
use rockets_autopilot::runner::{run, write_report, RunOptions};
use rockets_autopilot::util::{parse_seed, seed_to_hex, SeedSource};
use rockets_core::SimConfig;
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "rockets-autopilot")]
#[command(about = "Headless driver for the smart-rockets genetic algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve one population for a number of generations
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 100)]
        generations: u32,
        /// Overrides the config seed (decimal or 0x-prefixed hex)
        #[arg(long)]
        seed: Option<String>,
        /// Stop after the first generation that reaches the target
        #[arg(long, default_value_t = false)]
        until_solved: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run independent simulations across many seeds in parallel
    Benchmark {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 100)]
        generations: u32,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Load and validate a config file, printing the resolved parameters
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
    /// Print or write the built-in default config
    DefaultConfig {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let directives = env::var(ENV_LOG).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    match Cli::parse().command {
        Commands::Run {
            config,
            generations,
            seed,
            until_solved,
            output,
        } => {
            let mut sim_config = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                sim_config.seed = Some(parse_seed(&seed)?);
            }
            let report = run(
                sim_config,
                RunOptions {
                    generations,
                    until_solved,
                },
            )?;

            println!("seed={}", report.seed_hex);
            println!("population={}", report.population_size);
            println!("lifespan={}", report.lifespan);
            println!("generations_run={}", report.generations_run);
            println!(
                "solved_at={}",
                report
                    .solved_at
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            if let Some(ticks) = report.fastest_arrival {
                println!("fastest_arrival={ticks}");
            }
            println!("best_fitness={:.3}", report.best_fitness_so_far);

            if let Some(path) = output {
                write_report(&path, &report)?;
                println!("output={}", path.display());
            }
        }
        Commands::Benchmark {
            config,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            generations,
            jobs,
            out_dir,
        } => {
            let sim_config = load_config(config.as_deref())?;
            let seeds = SeedSource {
                file: seed_file,
                csv: seeds,
                start: seed_start,
                count: seed_count,
            }
            .resolve()?;
            let out_dir = out_dir
                .unwrap_or_else(|| PathBuf::from(format!("benchmarks/{}", timestamp_suffix())));

            let report = run_benchmark(BenchmarkConfig {
                config: sim_config,
                seeds,
                generations,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("solve_rate={:.0}%", report.solve_rate * 100.0);
            if let Some(avg) = report.avg_solved_at {
                println!("avg_solved_at={avg:.1}");
            }
            println!("avg_best_fitness={:.3}", report.avg_best_fitness);
            println!("out_dir={}", out_dir.display());
            println!("top seeds:");
            for (idx, run) in report.runs.iter().take(5).enumerate() {
                println!(
                    "  {}. {}  solved_at={} best={:.3} mean={:.3}",
                    idx + 1,
                    run.seed_hex,
                    run.solved_at
                        .map(|value| value.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    run.best_fitness,
                    run.final_mean_fitness,
                );
            }
        }
        Commands::CheckConfig { config } => {
            let sim_config = load_config(Some(&config))?;
            println!("config={}", config.display());
            println!("population={}", sim_config.population_size);
            println!("lifespan={}", sim_config.lifespan);
            println!("mutation_rate={}", sim_config.mutation_rate);
            println!("force_bound={}", sim_config.force_bound);
            println!("obstacles={}", sim_config.obstacles.len());
            println!(
                "bounds={}x{}",
                sim_config.bounds.width, sim_config.bounds.height
            );
            println!("elitism={}", sim_config.elitism);
            if let Some(seed) = sim_config.seed {
                println!("seed={}", seed_to_hex(seed));
            }
        }
        Commands::DefaultConfig { output } => {
            let defaults = SimConfig::default();
            if let Some(path) = output {
                write_report(&path, &defaults)?;
                println!("wrote={}", path.display());
            } else {
                let encoded = serde_json::to_vec_pretty(&defaults)?;
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
    }

    Ok(())
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
