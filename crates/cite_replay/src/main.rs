use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cite_core::config::InteractionConfig;
use cite_core::error::AppError;
use cite_replay_lib::{load_scenario, run_scenario};
use tracing_subscriber::EnvFilter;

/// Replay a citation interaction scenario and print one JSON line per step.
#[derive(Debug, Parser)]
#[command(name = "cite_replay", version, about)]
struct Args {
    /// Scenario file (JSON).
    scenario: PathBuf,

    /// Interaction config file (JSON). Defaults apply to omitted fields.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let json = serde_json::to_string(&e).unwrap_or_else(|_| e.to_string());
            eprintln!("{json}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => InteractionConfig::load(path)?,
        None => InteractionConfig::default(),
    };
    let scenario = load_scenario(&args.scenario)?;
    let outcome = run_scenario(&scenario, &config)?;

    for w in &outcome.warnings {
        tracing::warn!(code = %w.code, details = ?w.details, "{}", w.message);
    }
    for record in &outcome.records {
        let line = serde_json::to_string(record).map_err(|e| {
            AppError::new("REPLAY_OUTPUT_FAILED", "Failed to serialize replay record")
                .with_details(e.to_string())
        })?;
        println!("{line}");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
