//! Headless Economy Simulation
//!
//! Runs the economy for a fixed number of ticks, logging periodic summaries
//! and optionally loading and saving world snapshots.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use econ_core::config::BirthTimingMode;
use econ_core::{Config, Economy, ScenarioPreset};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "econ_sim")]
#[command(about = "A tick-driven agent-based economy simulation")]
struct Args {
    /// Random seed for reproducibility (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate (overrides the config file)
    #[arg(long)]
    ticks: Option<u64>,

    /// Random agents created before the first tick (overrides the config file)
    #[arg(long)]
    population: Option<usize>,

    /// Tuning file
    #[arg(long, default_value = econ_core::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scenario preset: normal, recession, automation or ubi
    #[arg(long)]
    scenario: Option<ScenarioPreset>,

    /// Snapshot to load before running
    #[arg(long)]
    load: Option<PathBuf>,

    /// Where to save the final world
    #[arg(long)]
    save: Option<PathBuf>,

    /// Ticks between summaries (overrides the config file)
    #[arg(long)]
    report_interval: Option<u64>,

    /// Pace births by simulated tick time instead of wall time
    #[arg(long)]
    simulated_births: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = build_config(&args);

    println!("Economy Simulation");
    println!("==================");
    println!("Seed: {}", config.simulation.seed);
    println!("Ticks: {}", config.simulation.ticks);
    println!("Initial population: {}", config.simulation.initial_population);
    println!();

    let mut economy = Economy::new(&config);
    if let Some(preset) = args.scenario {
        economy.apply_scenario(preset);
    }
    if let Some(path) = &args.load {
        economy.import_world_state(path);
    }

    let interval = config.simulation.report_interval.max(1);
    for _ in 0..config.simulation.ticks {
        economy.tick();
        if economy.tick_count() % interval == 0 {
            report(&economy);
        }
    }

    println!();
    println!("Simulation complete after {} ticks.", economy.tick_count());
    report(&economy);
    for line in economy.event_log().recent(10) {
        println!("  {}", line);
    }

    if let Some(path) = &args.save {
        if let Err(e) = economy.export_world_state(path) {
            tracing::error!("Could not save world to {}: {}", path.display(), e);
        }
    }
}

/// Load the tuning file and fold in command line overrides
fn build_config(args: &Args) -> Config {
    let mut config = if args.config.exists() {
        Config::load(&args.config).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", args.config.display(), e);
            Config::default()
        })
    } else {
        Config::default()
    };

    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    if let Some(population) = args.population {
        config.simulation.initial_population = population;
    }
    if let Some(interval) = args.report_interval {
        config.simulation.report_interval = interval;
    }
    if args.simulated_births {
        config.population.birth_timing = BirthTimingMode::Simulated;
    }
    config
}

fn report(economy: &Economy) {
    let cycle = economy.macro_cycle();
    let classes: Vec<String> = economy
        .class_counts()
        .into_iter()
        .map(|(class, count)| format!("{}={}", class, count))
        .collect();
    let prices: Vec<String> = economy
        .get_company_stats()
        .into_iter()
        .map(|(industry, stats)| {
            format!("{} {:.2} ({:+.2}%)", industry, stats.stock_price, stats.percent_change)
        })
        .collect();

    tracing::info!(
        "Tick {}: {} agents [{}], {} phase, inflation {:.2}%, output {}",
        economy.tick_count(),
        economy.population().len(),
        classes.join(" "),
        cycle.phase,
        cycle.inflation_rate * 100.0,
        economy.market_report().total_output
    );
    tracing::info!("  Stocks: {}", prices.join(", "));
}
