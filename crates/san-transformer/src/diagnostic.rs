//! Diagnostic types.
//!
//! Conversion never stops on unsupported input; it records a diagnostic and
//! leaves the offending construct as it was.

use sfc_markup::{ParseError, Span};

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// The location in the component file, when known.
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            span: None,
        }
    }

    /// Attaches a source location.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Creates a diagnostic from a recovered markup parse error.
    pub fn from_parse_error(error: &ParseError) -> Self {
        Self::new(DiagnosticCode::MarkupParseError, error.to_string()).with_span(error.span)
    }
}

/// Logs a diagnostic and adds it to the sink.
pub(crate) fn report(sink: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!(code = %diagnostic.code, "{}", diagnostic.message);
    sink.push(diagnostic);
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The output is usable but something was left unconverted.
    Warning,
    /// The input itself is malformed.
    Error,
}

/// Diagnostic codes for every non-fatal conversion issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `unsupported-directive`: a `v-` attribute with no San counterpart.
    UnsupportedDirective,
    /// `unsupported-class-binding`: `:class` that is not an array or object literal.
    UnsupportedClassBinding,
    /// `unsupported-style-binding`: `:style` that is not an object literal.
    UnsupportedStyleBinding,
    /// `unsupported-data-initializer`: a `data` function that takes arguments.
    UnsupportedDataInitializer,
    /// `unsupported-assignment-target`: a `this` member used as a
    /// destructuring or `for-in`/`for-of` target.
    UnsupportedAssignmentTarget,
    /// `markup-parse-error`: the component markup could not be parsed cleanly.
    MarkupParseError,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::MarkupParseError => Severity::Error,
            DiagnosticCode::UnsupportedDirective
            | DiagnosticCode::UnsupportedClassBinding
            | DiagnosticCode::UnsupportedStyleBinding
            | DiagnosticCode::UnsupportedDataInitializer
            | DiagnosticCode::UnsupportedAssignmentTarget => Severity::Warning,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnsupportedDirective => "unsupported-directive",
            DiagnosticCode::UnsupportedClassBinding => "unsupported-class-binding",
            DiagnosticCode::UnsupportedStyleBinding => "unsupported-style-binding",
            DiagnosticCode::UnsupportedDataInitializer => "unsupported-data-initializer",
            DiagnosticCode::UnsupportedAssignmentTarget => "unsupported-assignment-target",
            DiagnosticCode::MarkupParseError => "markup-parse-error",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
