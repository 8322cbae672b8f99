//! Command-line runner for the reference scenarios
//!
//! Usage:
//! ```bash
//! firm-control monopolist --config monopolist.json --days 3000
//! RUST_LOG=firm_control_core_rs=debug firm-control buyer --seed 7
//! ```
//!
//! The config file is JSON; missing fields take their defaults. The run
//! summary is printed to stdout as JSON, logs go to stderr.

use clap::{Args, Parser, Subcommand};
use firm_control_core_rs::scenario::{
    find_worker_target_that_maximizes_profits, BuyerConfig, BuyerScenario, MonopolistConfig,
    MonopolistScenario, ScenarioError,
};
use firm_control_core_rs::workforce::AlgorithmRegistry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "firm-control")]
#[command(version, about = "Run firm control scenarios", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One plant hiring from a linear labor supply
    Monopolist {
        #[command(flatten)]
        common: CommonArgs,

        /// Maximization algorithm; `random` draws one
        #[arg(long)]
        algorithm: Option<String>,
    },
    /// A purchasing department managing its stock
    Buyer {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Profit-maximizing workforce of a linear monopolist market
    Optimum {
        #[arg(long, default_value_t = 118.0)]
        demand_intercept: f64,
        #[arg(long, default_value_t = 3.0)]
        demand_slope: f64,
        #[arg(long, default_value_t = 11.0)]
        wage_intercept: f64,
        #[arg(long, default_value_t = 2.0)]
        wage_slope: f64,
        #[arg(long, default_value_t = 3.0)]
        productivity: f64,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of days
    #[arg(long)]
    days: Option<usize>,

    /// Write the daily trajectory here as JSON
    #[arg(long)]
    trajectory: Option<PathBuf>,

    /// Include the event log in the output
    #[arg(long)]
    events: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, CliError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn run_monopolist(
    common: &CommonArgs,
    algorithm: Option<String>,
) -> Result<serde_json::Value, CliError> {
    let mut config: MonopolistConfig = load_config(common.config.as_deref())?;
    if let Some(seed) = common.seed {
        config.seed = seed;
    }
    if let Some(days) = common.days {
        config.days = days;
    }
    match algorithm.as_deref() {
        Some("random") => config.algorithm = None,
        Some(name) => config.algorithm = Some(name.to_string()),
        None => {}
    }

    let registry = AlgorithmRegistry::with_builtin_algorithms();
    let mut scenario = MonopolistScenario::new(config, &registry)?;
    let summary = scenario.run()?;
    info!(
        algorithm = %summary.algorithm,
        final_workers = summary.final_workers,
        optimal_workers = summary.optimal_workers,
        "monopolist finished"
    );

    if let Some(path) = &common.trajectory {
        write_json(path, scenario.trajectory())?;
    }
    let mut output = json!({ "summary": summary });
    if common.events {
        output["events"] = serde_json::to_value(scenario.event_log().events())?;
    }
    Ok(output)
}

fn run_buyer(common: &CommonArgs) -> Result<serde_json::Value, CliError> {
    let mut config: BuyerConfig = load_config(common.config.as_deref())?;
    if let Some(seed) = common.seed {
        config.seed = seed;
    }
    if let Some(days) = common.days {
        config.days = days;
    }

    let mut scenario = BuyerScenario::new(config)?;
    let summary = scenario.run()?;
    info!(
        final_price = summary.final_price,
        stock_target = summary.stock_target,
        "buyer finished"
    );

    if let Some(path) = &common.trajectory {
        write_json(path, scenario.trajectory())?;
    }
    let mut output = json!({ "summary": summary });
    if common.events {
        output["events"] = serde_json::to_value(scenario.event_log().events())?;
    }
    Ok(output)
}

fn run(cli: Cli) -> Result<serde_json::Value, CliError> {
    match cli.command {
        Command::Monopolist { common, algorithm } => run_monopolist(&common, algorithm),
        Command::Buyer { common } => run_buyer(&common),
        Command::Optimum {
            demand_intercept,
            demand_slope,
            wage_intercept,
            wage_slope,
            productivity,
        } => {
            let workers = find_worker_target_that_maximizes_profits(
                demand_intercept,
                demand_slope,
                wage_intercept,
                wage_slope,
                productivity,
            );
            Ok(json!({
                "optimal_workers": workers,
                "optimal_wage": wage_intercept + wage_slope * workers as f64,
            }))
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli).and_then(|output| Ok(serde_json::to_string_pretty(&output)?)) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
