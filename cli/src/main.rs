#![deny(missing_docs)]

//! # sportsgen
//!
//! Generates one API consumer client library per configured endpoint by
//! merging the endpoint's versioned swagger fragments into a single document
//! and handing it to the external code generator.

use clap::Parser;
use sportsgen_core::config;
use sportsgen_core::emit::ExternalGenerator;
use sportsgen_core::fetch::HttpFetcher;
use sportsgen_core::AppResult;
use std::path::PathBuf;

mod generate;

/// Bundled fallback for `--config`.
const DEFAULT_CONFIG: &str = include_str!("../config.default.json");

/// Bundled fallback for `--endpoints-config`.
const DEFAULT_ENDPOINTS: &str = include_str!("../endpoints.json");

/// Generate a Sportsdata.io API consumer client.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the run configuration file. The bundled default configuration
    /// is used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the endpoint registry file. The bundled registry is used when
    /// omitted.
    #[arg(long)]
    endpoints_config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> AppResult<()> {
    let registry = match &cli.endpoints_config {
        Some(path) => config::load_registry(path)?,
        None => config::parse_registry(DEFAULT_ENDPOINTS)?,
    };
    let run_config = match &cli.config {
        Some(path) => config::load_config(path, &registry)?,
        None => config::parse_config(DEFAULT_CONFIG, &registry)?,
    };

    let summary = generate::execute(
        &run_config,
        &registry,
        &HttpFetcher::new(),
        &ExternalGenerator,
    )?;

    // Endpoint failures were already reported; they do not fail the run.
    println!(
        "Run finished: {} generated, {} failed.",
        summary.succeeded.len(),
        summary.failed.len()
    );
    Ok(())
}
