//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `redirect_detector` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Writing the JSON report to stdout or `--output`
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::process;

use redirect_detector::initialization::{init_crypto_provider, init_logger_with};
use redirect_detector::{run_scan, Config, RiskReport};

fn write_report(report: &RiskReport, config: &Config) -> Result<()> {
    let json = report
        .to_json(config.pretty)
        .context("Failed to serialize report")?;
    match &config.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), so
    // URLHAUS_AUTH_KEY and CHROME_PATH need not be exported manually.
    // Try the current directory first, then the executable's directory.
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    match run_scan(config.clone()).await {
        Ok(report) => write_report(&report, &config),
        Err(e) => {
            eprintln!("redirect_detector error: {:#}", e);
            process::exit(1);
        }
    }
}
