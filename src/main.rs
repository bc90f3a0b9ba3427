//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `chaselink` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Progress output and the result sinks
//!
//! All chasing is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::warn;

use chaselink::app::{parse_start_url, ProgressPrinter};
use chaselink::config::Cli;
use chaselink::export::{open_output, write_details, write_final_body};
use chaselink::initialization::{init_crypto_provider, init_logger_with};
use chaselink::{ChaseEngine, ClientOptions, ExportError, HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logger based on flags
    let log_level = cli.log_level.clone();
    let log_format = cli.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let initial = parse_start_url(&cli.url)
        .unwrap_or_else(|e| fatal(&format!("Failed to create request: {e:#}")));
    let transport = HttpTransport::new(&ClientOptions::default())
        .unwrap_or_else(|e| fatal(&format!("Failed to create user agent: {e}")));

    let mut engine = ChaseEngine::new(transport, cli.chase_config());
    if !cli.silent {
        engine = engine.with_progress(ProgressPrinter::stderr());
    }
    let report = engine.chase(initial).await;

    if let Some(path) = &cli.details {
        let writer = open_output(path)
            .unwrap_or_else(|e| fatal(&format!("Failed to create output file: {e}")));
        if let Err(e) = write_details(&report.pages, writer) {
            fatal(&format!("Failed to write output file: {e}"));
        }
    }

    if let Some(path) = &cli.output {
        if report.pages.is_empty() {
            warn!("{}", ExportError::NoPages);
            eprintln!("{}", ExportError::NoPages.to_string().yellow());
        } else {
            let writer = open_output(path)
                .unwrap_or_else(|e| fatal(&format!("Failed to create output file: {e}")));
            if let Err(e) = write_final_body(&report.pages, writer) {
                fatal(&format!("Failed to write output file: {e}"));
            }
        }
    }

    if let Some(error) = report.error {
        fatal(&format!("chaselink failed: {error:#}"));
    }
    Ok(())
}

/// Prints `message` in red on stderr and exits with status 1.
fn fatal(message: &str) -> ! {
    eprintln!("{}", message.red());
    process::exit(1);
}
