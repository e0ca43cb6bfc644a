//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use san_transformer::{ConvertError, Diagnostic, Severity};
use serde::Serialize;
use text_size::TextSize;

/// A formatted diagnostic for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error or Warning).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// The start position, when the diagnostic has a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    /// The end position, when the diagnostic has a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

impl Position {
    /// Resolves a byte offset in `source` to a line and column.
    pub fn at(source: &str, offset: TextSize) -> Self {
        let offset = u32::from(offset).min(source.len() as u32);
        let mut end = offset as usize;
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let before = &source[..end];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);

        Self {
            line: before.matches('\n').count() as u32 + 1,
            column: before[line_start..].chars().count() as u32 + 1,
            offset,
        }
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
    }
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Resolves diagnostics against the file they were reported for.
    pub fn prepare(
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
        source: &str,
    ) -> Vec<FormattedDiagnostic> {
        diagnostics
            .iter()
            .map(|diag| FormattedDiagnostic {
                diagnostic_type: severity_label(diag.severity).to_string(),
                filename: file_path.to_string(),
                start: diag.span.map(|span| Position::at(source, span.start())),
                end: diag.span.map(|span| Position::at(source, span.end())),
                message: diag.message.clone(),
                code: diag.code.to_string(),
            })
            .collect()
    }

    /// Describes a conversion that failed outright.
    pub fn failure(error: &ConvertError, file_path: &Utf8Path) -> FormattedDiagnostic {
        let code = match error {
            ConvertError::ScriptParse { .. } => "script-parse-error",
            ConvertError::Rewrite(_) => "rewrite-error",
        };
        FormattedDiagnostic {
            diagnostic_type: severity_label(Severity::Error).to_string(),
            filename: file_path.to_string(),
            start: None,
            end: None,
            message: error.to_string(),
            code: code.to_string(),
        }
    }

    /// Formats a collection of diagnostics.
    pub fn format(&self, diagnostics: &[FormattedDiagnostic]) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(diagnostics),
            OutputFormat::Json => serde_json::to_string_pretty(diagnostics).unwrap_or_default(),
        }
    }

    fn format_human(diagnostics: &[FormattedDiagnostic]) -> String {
        let mut output = String::new();

        for diag in diagnostics {
            match diag.start {
                Some(start) => output.push_str(&format!(
                    "{}:{}:{}\n",
                    diag.filename, start.line, start.column
                )),
                None => output.push_str(&format!("{}\n", diag.filename)),
            }
            output.push_str(&format!(
                "{}: {} ({})\n\n",
                diag.diagnostic_type, diag.message, diag.code
            ));
        }

        output
    }
}

/// Counts for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Number of files converted.
    pub file_count: usize,
    /// Number of files that could not be converted.
    pub failed_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
}

impl ConvertSummary {
    /// Whether the run should exit with a failure status.
    pub fn should_fail(&self, fail_on_warnings: bool) -> bool {
        self.failed_count > 0
            || self.error_count > 0
            || (fail_on_warnings && self.warning_count > 0)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let plural = |count: usize, word: &str| {
            if count == 1 {
                format!("{count} {word}")
            } else {
                format!("{count} {word}s")
            }
        };

        let mut line = format!(
            "====================================\nvue2san converted {} with {} and {}",
            plural(self.file_count, "file"),
            plural(self.error_count, "error"),
            plural(self.warning_count, "warning"),
        );
        if self.failed_count > 0 {
            line.push_str(&format!("; {} failed", plural(self.failed_count, "file")));
        }
        line
    }
}
