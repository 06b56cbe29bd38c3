//! forage-sim CLI entry point.

mod window;

use clap::{Parser, Subcommand};
use forage_sim::series::{POPULATION_LABELS, SeriesLog, population_sample};
use forage_sim::simulation_stats::SimulationStats;
use forage_sim::{HeadlessSink, PopulationStats, Simulation, SimulationConfig};
use rand::Rng;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "forage-sim")]
#[command(version)]
#[command(about = "Predator-free evolutionary foraging simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window and run in real time
    Window {
        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run without rendering
    Headless {
        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Random seed of the first run
        #[arg(long)]
        seed: Option<u64>,

        /// Independent runs, executed in parallel with consecutive seeds
        #[arg(short, long, default_value = "1")]
        runs: u64,

        /// Pace ticks with the scheduler instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Write per-tick population averages as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Window { config, seed } => window::run(load_config(config.as_deref())?, seed),
        Commands::Headless {
            config,
            ticks,
            seed,
            runs,
            realtime,
            csv,
        } => run_headless(
            load_config(config.as_deref())?,
            ticks,
            seed,
            runs,
            realtime,
            csv,
        ),
        Commands::Init { output } => {
            SimulationConfig::default().save(&output)?;
            println!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> forage_sim::Result<SimulationConfig> {
    match path {
        Some(path) => {
            log::info!("Loading config from {:?}", path);
            SimulationConfig::from_file(path)
        }
        None => Ok(SimulationConfig::default()),
    }
}

struct RunSummary {
    seed: u64,
    ticks: u64,
    stats: PopulationStats,
    lifetime: SimulationStats,
}

fn run_headless(
    config: SimulationConfig,
    ticks: u64,
    seed: Option<u64>,
    runs: u64,
    realtime: bool,
    csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let first_seed = seed.unwrap_or_else(|| rand::rng().random());
    let started = Instant::now();

    let summaries = (0..runs)
        .into_par_iter()
        .map(|run| {
            let csv = csv.as_ref().map(|path| csv_path(path, run, runs));
            run_once(config.clone(), ticks, first_seed.wrapping_add(run), realtime, csv)
        })
        .collect::<forage_sim::Result<Vec<RunSummary>>>()?;

    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", started.elapsed().as_secs_f64());
    for summary in &summaries {
        println!(
            "seed {}: ticks={} {} births={} deaths={} eaten={} max_population={}",
            summary.seed,
            summary.ticks,
            summary.stats.summary(),
            summary.lifetime.total_births,
            summary.lifetime.total_deaths,
            summary.lifetime.food_eaten,
            summary.lifetime.max_population
        );
    }
    Ok(())
}

fn csv_path(path: &Path, run: u64, runs: u64) -> PathBuf {
    if runs == 1 {
        return path.to_path_buf();
    }
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("run");
    path.with_file_name(format!("{}-{}.csv", stem, run))
}

fn run_once(
    config: SimulationConfig,
    ticks: u64,
    seed: u64,
    realtime: bool,
    csv: Option<PathBuf>,
) -> forage_sim::Result<RunSummary> {
    let mut sim = Simulation::with_seed(config, HeadlessSink::new(), seed)?;
    let mut series = SeriesLog::new(POPULATION_LABELS);

    if realtime {
        sim.on_ups(move |ups| log::info!("[seed {}] ups={}", seed, ups));
        sim.start()?;
    }

    while sim.ticks() < ticks {
        if realtime {
            if let Some(deadline) = sim.scheduler().next_deadline() {
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
            }
            let before = sim.ticks();
            if let Err(err) = sim.pump(Instant::now()) {
                sim.stop();
                return Err(err);
            }
            if sim.ticks() == before {
                continue;
            }
        } else {
            sim.tick()?;
        }

        series.add(&population_sample(sim.stats()))?;
        if sim.number_of_agents() == 0 {
            log::info!("[seed {}] Population extinct at tick {}", seed, sim.ticks());
            break;
        }
    }
    sim.stop();

    if let Some(path) = csv {
        series.write_csv(BufWriter::new(File::create(&path)?))?;
        log::info!("[seed {}] Series written to {:?}", seed, path);
    }

    Ok(RunSummary {
        seed,
        ticks: sim.ticks(),
        stats: *sim.stats(),
        lifetime: sim.lifetime().clone(),
    })
}
