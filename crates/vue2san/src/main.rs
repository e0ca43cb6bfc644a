//! vue2san: convert Vue single-file components to San.

mod cli;
mod config;
mod orchestrator;
mod output;
mod tracing_config;

use clap::Parser;
use cli::Args;
use miette::{IntoDiagnostic, Result};

fn main() -> Result<()> {
    tracing_config::init_tracing();
    let args = Args::parse();

    let summary = orchestrator::run(&args).into_diagnostic()?;
    if summary.should_fail(args.fail_on_warnings) {
        std::process::exit(1);
    }
    Ok(())
}
