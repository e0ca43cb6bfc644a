//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{ConfigError, Settings};
use crate::output::{ConvertSummary, FormattedDiagnostic, Formatter};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use san_transformer::{convert_component, ConvertOptions};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of the files picked up from input directories.
const SOURCE_EXTENSION: &str = "vue";

/// Extension of converted files.
const OUTPUT_EXTENSION: &str = "san";

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// An input path does not exist.
    #[error("input not found: {0}")]
    MissingInput(Utf8PathBuf),

    /// The working directory is not usable.
    #[error("invalid working directory: {0}")]
    WorkingDirectory(String),
}

/// A discovered component file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceFile {
    path: Utf8PathBuf,
    /// The directory the file was found under; output paths mirror the
    /// layout relative to it.
    root: Utf8PathBuf,
}

/// The result of converting one file.
#[derive(Debug)]
struct FileOutcome {
    path: Utf8PathBuf,
    /// Converted text, kept only when printing to stdout.
    code: Option<String>,
    diagnostics: Vec<FormattedDiagnostic>,
    failed: bool,
}

/// Everything a run produced, before it is printed.
#[derive(Debug)]
struct RunReport {
    summary: ConvertSummary,
    outcomes: Vec<FileOutcome>,
}

/// Converts all inputs and prints diagnostics.
pub fn run(args: &Args) -> Result<ConvertSummary, OrchestratorError> {
    let cwd = std::env::current_dir()
        .map_err(|e| OrchestratorError::WorkingDirectory(e.to_string()))
        .and_then(|p| {
            Utf8PathBuf::try_from(p)
                .map_err(|e| OrchestratorError::WorkingDirectory(e.to_string()))
        })?;

    let report = convert_all(args, &cwd)?;

    let diagnostics: Vec<FormattedDiagnostic> = report
        .outcomes
        .iter()
        .flat_map(|outcome| outcome.diagnostics.iter().cloned())
        .collect();
    let formatter = Formatter::new(args.output);
    let rendered = formatter.format(&diagnostics);

    if args.stdout {
        for outcome in &report.outcomes {
            if let Some(code) = &outcome.code {
                tracing::debug!(path = %outcome.path, "printing converted file");
                print!("{}", code);
            }
        }
        eprint!("{}", rendered);
        if args.output == OutputFormat::Human {
            eprintln!("{}", report.summary.format());
        }
    } else {
        match args.output {
            OutputFormat::Human => {
                print!("{}", rendered);
                println!("{}", report.summary.format());
            }
            OutputFormat::Json => println!("{}", rendered),
        }
    }

    Ok(report.summary)
}

/// Discovers and converts every input file.
fn convert_all(args: &Args, cwd: &Utf8Path) -> Result<RunReport, OrchestratorError> {
    let settings = Settings::resolve(args, cwd)?;
    let ignore_set = build_ignore_set(&settings.ignore)?;

    let mut files = Vec::new();
    for input in &args.inputs {
        files.extend(discover(&absolute(cwd, input), &ignore_set)?);
    }
    tracing::debug!(files = files.len(), "discovered component files");

    let out_dir = args.out_dir.as_ref().map(|dir| absolute(cwd, dir));
    let error_count = AtomicUsize::new(0);
    let warning_count = AtomicUsize::new(0);

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| {
            let outcome = convert_file(file, &settings.options, out_dir.as_deref(), args.stdout);
            for diag in &outcome.diagnostics {
                if diag.diagnostic_type == "Error" {
                    error_count.fetch_add(1, Ordering::Relaxed);
                } else {
                    warning_count.fetch_add(1, Ordering::Relaxed);
                }
            }
            outcome
        })
        .collect();

    let failed_count = outcomes.iter().filter(|o| o.failed).count();
    let summary = ConvertSummary {
        file_count: outcomes.len() - failed_count,
        failed_count,
        error_count: error_count.load(Ordering::Relaxed),
        warning_count: warning_count.load(Ordering::Relaxed),
    };

    Ok(RunReport { summary, outcomes })
}

fn absolute(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_owned()
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }

    // Add default ignores
    for pattern in ["**/node_modules/**", "**/dist/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            ignore_builder.add(glob);
        }
    }

    ignore_builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Expands one input into component files.
///
/// An explicit file is always converted; directories are walked for `.vue`
/// files that match no ignore pattern.
fn discover(input: &Utf8Path, ignore_set: &GlobSet) -> Result<Vec<SourceFile>, OrchestratorError> {
    if input.is_file() {
        let root = input.parent().unwrap_or(input).to_owned();
        return Ok(vec![SourceFile {
            path: input.to_owned(),
            root,
        }]);
    }
    if !input.is_dir() {
        return Err(OrchestratorError::MissingInput(input.to_owned()));
    }

    let mut files: Vec<SourceFile> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| p.extension() == Some(SOURCE_EXTENSION))
        .filter(|p| {
            let relative = p.strip_prefix(input).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .map(|path| SourceFile {
            path,
            root: input.to_owned(),
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Where the converted form of `file` is written.
fn output_path(file: &SourceFile, out_dir: Option<&Utf8Path>) -> Utf8PathBuf {
    match out_dir {
        Some(dir) => {
            let relative = file.path.strip_prefix(&file.root).unwrap_or(&file.path);
            dir.join(relative).with_extension(OUTPUT_EXTENSION)
        }
        None => file.path.with_extension(OUTPUT_EXTENSION),
    }
}

fn convert_file(
    file: &SourceFile,
    options: &ConvertOptions,
    out_dir: Option<&Utf8Path>,
    to_stdout: bool,
) -> FileOutcome {
    let io_failure = |message: String| FileOutcome {
        path: file.path.clone(),
        code: None,
        diagnostics: vec![FormattedDiagnostic {
            diagnostic_type: "Error".to_string(),
            filename: file.path.to_string(),
            start: None,
            end: None,
            message,
            code: "io-error".to_string(),
        }],
        failed: true,
    };

    let source = match fs::read_to_string(&file.path) {
        Ok(source) => source,
        Err(e) => return io_failure(format!("failed to read file: {}", e)),
    };

    let output = match convert_component(&source, options) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(path = %file.path, error = %e, "conversion failed");
            return FileOutcome {
                path: file.path.clone(),
                code: None,
                diagnostics: vec![Formatter::failure(&e, &file.path)],
                failed: true,
            };
        }
    };

    let diagnostics = Formatter::prepare(&output.diagnostics, &file.path, &source);

    if to_stdout {
        return FileOutcome {
            path: file.path.clone(),
            code: Some(output.code),
            diagnostics,
            failed: false,
        };
    }

    let destination = output_path(file, out_dir);
    let written = destination
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(&destination, &output.code));
    if let Err(e) = written {
        return io_failure(format!("failed to write {}: {}", destination, e));
    }
    tracing::debug!(from = %file.path, to = %destination, "converted");

    FileOutcome {
        path: file.path.clone(),
        code: None,
        diagnostics,
        failed: false,
    }
}
