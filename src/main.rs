//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `tracker_watch` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use tracker_watch::initialization::init_logger_with;
use tracker_watch::{check_config, load_config, run_monitor, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
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

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tracker_watch error: {:#}", e);
            process::exit(1);
        }
    };

    if cli.check_config {
        println!("{}", "=".repeat(50));
        println!("  Tracker Monitor - Configuration Test");
        println!("{}", "=".repeat(50));
        println!("✅ Configuration loaded from {}", cli.config.display());
        let report = check_config(&config).await?;
        println!("\n{}", "=".repeat(50));
        if report.passed() {
            println!("✅ Testing complete!");
            return Ok(());
        }
        println!("❌ Configuration needs attention");
        process::exit(1);
    }

    match run_monitor(config, cli.once).await {
        Ok(report) => {
            println!(
                "Monitor stopped after {} cycle{} ({} aborted)",
                report.cycles,
                if report.cycles == 1 { "" } else { "s" },
                report.failed_cycles
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("tracker_watch error: {:#}", e);
            process::exit(1);
        }
    }
}
