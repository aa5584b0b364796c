//! tarhl - extract tar archives, hard-linking files that are unchanged
//! against a base directory.

mod cli;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tarhl_core::NoopProgress;
use tarhl_core::ProgressCallback;
use tarhl_core::extract_archive_file;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    setup_logging(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "extraction failed");
            formatter.format_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays reserved for the result.
fn setup_logging(verbose: bool) {
    let default = if verbose {
        "tarhl=debug,tarhl_core=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &cli::Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = cli.extract_config();

    let progress: Box<dyn ProgressCallback> =
        if !cli.quiet && !cli.json && CliProgress::should_show() {
            Box::new(CliProgress::new())
        } else {
            Box::new(NoopProgress)
        };

    let report = add_archive_context(extract_archive_file(&cli.file, &config, progress), &cli.file)?;
    formatter.format_extraction_result(&report)
}
