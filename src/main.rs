use clap::{Parser, ValueEnum};
use color_eyre::Result;
use env_logger::Env;
use log::{info, LevelFilter};
use std::io;
use std::path::PathBuf;

use deadlocksim::config::Config;
use deadlocksim::config_loader::{self, CliOverrides};
use deadlocksim::orchestrator;
use deadlocksim::report::{JsonLinesSink, ReportSink, TextSink};

/// Resource allocation simulator with deadlock detection and resolution
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation configuration YAML file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of steps to simulate
    #[arg(short, long)]
    steps: Option<u64>,

    /// Seed for the action policy, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of processes
    #[arg(short, long)]
    processes: Option<usize>,

    /// Report format written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging before loading configuration. RUST_LOG wins when
    // set; otherwise start at "info" and switch to the configured level below.
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::from_env(Env::default().default_filter_or("trace")).init();
    if !rust_log_set {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Starting DeadlockSim");

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };

    if !rust_log_set {
        log::set_max_level(level_filter(config.general.log_level.as_deref()));
    }

    let overrides = CliOverrides {
        steps: args.steps,
        seed: args.seed,
        processes: args.processes,
    };
    config_loader::apply_overrides(&mut config, &overrides)?;

    let stdout = io::stdout();
    let mut sink: Box<dyn ReportSink> = match args.format {
        OutputFormat::Text => Box::new(TextSink::new(stdout.lock())),
        OutputFormat::Json => Box::new(JsonLinesSink::new(stdout.lock())),
    };

    let summary = orchestrator::run_simulation(&config, sink.as_mut())?;

    info!("Victims chosen during the run: {:?}", summary.victims);
    Ok(())
}

/// Map a configured log level to a filter, "info" when unset or unknown
fn level_filter(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}
