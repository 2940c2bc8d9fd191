//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `email_posture` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::fs;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use email_posture::dns::ResolverGateway;
use email_posture::initialization::{init_logger_with, init_resolver};
use email_posture::{build_report_with, render_text, Config, ReportOptions};

/// Exit status for any failure that prevents a report.
const EXIT_FAILURE: i32 = 2;

#[tokio::main]
async fn main() {
    // Parse command-line arguments into Config
    let config = Config::parse();

    if let Err(e) = run(config).await {
        eprintln!("email_posture error: {e:#}");
        process::exit(EXIT_FAILURE);
    }
}

async fn run(config: Config) -> Result<()> {
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let options = ReportOptions::from_config(&config).context("Failed to load DKIM selectors")?;
    let resolver = init_resolver(&config).context("Failed to initialize DNS resolver")?;
    let gateway = ResolverGateway::new(resolver);

    let report = build_report_with(&gateway, &config.domain, &options)
        .await
        .with_context(|| format!("Could not check {}", config.domain.trim()))?;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    if let Some(path) = &config.json_out {
        fs::write(path, &json)
            .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;
    }

    if config.quiet {
        println!("{json}");
    } else {
        println!("{}", render_text(&report));
        if let Some(path) = &config.json_out {
            println!("JSON written to {}", path.display());
        }
    }
    Ok(())
}
