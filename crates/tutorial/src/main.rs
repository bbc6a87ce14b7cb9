use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pdecon_observers::LogObserver;
use pdecon_tutorial::{Backend, Experiment, ExperimentConfig};
use tracing_subscriber::EnvFilter;

/// Solve the semilinear Poisson control tutorial with two NLP solvers and compare them.
#[derive(Debug, Parser)]
#[command(name = "pdecon", version, about)]
struct Args {
    /// JSON experiment configuration; missing fields take their defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cells along each axis of the square domain.
    #[arg(long, value_name = "N")]
    cells: Option<usize>,

    /// Lagrange order of both the state and the control field.
    #[arg(long)]
    order: Option<usize>,

    /// Absolute and relative tolerance of both solvers.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Backend to run (`interior-point` or `augmented-lagrangian`); repeatable.
    #[arg(long = "backend", value_name = "NAME")]
    backends: Vec<Backend>,

    /// Log every solver iteration.
    #[arg(short, long)]
    verbose: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let report = if args.verbose {
        Experiment::run(&config, |stage| LogObserver::new(stage.to_string()))?
    } else {
        Experiment::run(&config, |_| ())?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => ExperimentConfig::default(),
    };

    if let Some(cells) = args.cells {
        config.cells = [cells, cells];
    }
    if let Some(order) = args.order {
        config.state_order = order;
        config.control_order = order;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if !args.backends.is_empty() {
        config.backends.clone_from(&args.backends);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,pdecon_observers=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
