//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Convert Vue single-file components to San components.
#[derive(Debug, Parser)]
#[command(name = "vue2san")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files or directories to convert
    #[arg(default_value = ".")]
    pub inputs: Vec<Utf8PathBuf>,

    /// Write converted files under this directory instead of next to their inputs
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Print converted files to stdout instead of writing them
    #[arg(long, conflicts_with = "out_dir")]
    pub stdout: bool,

    /// Path to a vue2san.config.json file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Constructor whose options object is a component (repeatable)
    #[arg(long = "constructor")]
    pub constructors: Vec<String>,

    /// Expression that replaces the constructor, e.g. San.defineComponent
    #[arg(long)]
    pub factory: Option<String>,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}
