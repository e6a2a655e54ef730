//! Diagnostic infrastructure for error reporting
//!
//! Turns parse and check errors into codespan diagnostics that render with
//! source context, either on a terminal or as JSON.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::Files;
use codespan_reporting::term;
use concrete_parser::{ParseError, ParseErrorKind, Span};
use concrete_types::TypeError;
use serde::{Deserialize, Serialize};
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::error::{CheckError, LoadError};
use crate::source::{FileId, SourceMap};

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    inner: CsDiagnostic<FileId>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, file: FileId, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::primary(file, span.start..span.end).with_message(message));
        self
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(
        mut self,
        file: FileId,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        self.inner
            .labels
            .push(Label::secondary(file, span.start..span.end).with_message(message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Get the underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<FileId> {
        &self.inner
    }

    /// Create diagnostic from a ParseError
    pub fn from_parse_error(error: &ParseError, file: FileId) -> Self {
        let (code, label) = match &error.kind {
            ParseErrorKind::UnexpectedToken { .. } => (ErrorCode("E1001"), "unexpected token"),
            ParseErrorKind::UnexpectedEof { .. } => (ErrorCode("E1002"), "unexpected end of file"),
            ParseErrorKind::InvalidSyntax { .. } => (ErrorCode("E1003"), "invalid syntax"),
            ParseErrorKind::Unsupported { .. } => (ErrorCode("E1004"), "not supported"),
            ParseErrorKind::MixedParameters => (ErrorCode("E1005"), "mixed parameter list"),
            ParseErrorKind::Lex(_) => (ErrorCode("E1006"), "invalid token"),
            ParseErrorKind::ParserLimitExceeded { .. } => (ErrorCode("E1007"), "limit exceeded"),
        };

        let mut diag = Diagnostic::error(error.message.clone())
            .with_code(code)
            .with_primary_label(file, error.span, label);
        if let Some(suggestion) = &error.suggestion {
            diag = diag.with_help(suggestion.clone());
        }
        diag
    }

    /// Create diagnostic from a CheckError
    pub fn from_check_error(error: &CheckError) -> Self {
        use CheckError::*;

        let location = error.location();
        let diag = Diagnostic::error(error.to_string()).with_code(error_code(error));

        match error {
            Duplicate {
                original,
                duplicate,
                ..
            } => {
                let diag =
                    diag.with_primary_label(duplicate.file, duplicate.span, "duplicate declaration");
                match original {
                    Some(original) => diag.with_secondary_label(
                        original.file,
                        original.span,
                        "first declaration here",
                    ),
                    None => diag,
                }
            }
            Undefined { .. } => diag.with_primary_label(location.file, location.span, "not declared"),
            NotAType { .. } => diag.with_primary_label(location.file, location.span, "not a type"),
            NotExported { package, .. } => diag
                .with_primary_label(location.file, location.span, "not exported")
                .with_note(format!(
                    "only names starting with an upper-case letter are visible outside package {}",
                    package
                )),
            UnresolvedImport { .. } => diag
                .with_primary_label(location.file, location.span, "cannot import")
                .with_note("relative imports are loaded from the directory of the importing package"),
            InvalidRecursiveType { .. } => {
                diag.with_primary_label(location.file, location.span, "type refers to itself")
            }
            InvalidInterface { error: type_error, .. } => {
                let diag = diag.with_primary_label(location.file, location.span, "invalid method set");
                match type_error {
                    TypeError::NotAnInterface { .. } => {
                        diag.with_help("only interfaces can be embedded in an interface")
                    }
                    TypeError::DuplicateMethod { .. } => {
                        diag.with_note("embedded interfaces declare the method with different signatures")
                    }
                    _ => diag,
                }
            }
            InvalidReceiver { .. } => {
                diag.with_primary_label(location.file, location.span, "invalid receiver")
            }
            DuplicateMethod { .. } => {
                diag.with_primary_label(location.file, location.span, "method redeclared")
            }
            DuplicateField { .. } => {
                diag.with_primary_label(location.file, location.span, "field redeclared")
            }
            PackageMismatch { expected, .. } => diag
                .with_primary_label(location.file, location.span, "different package clause")
                .with_help(format!("every file of the directory must declare package {}", expected)),
        }
    }

    /// Emit the diagnostic to stderr
    pub fn emit(
        &self,
        sources: &SourceMap,
        color: ColorChoice,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(color);
        self.emit_to(&mut writer, sources)
    }

    /// Emit the diagnostic to any color-capable writer
    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        sources: &SourceMap,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, sources.files(), &self.inner)
    }

    /// Convert to JSON representation for editor integration
    pub fn to_json(&self, sources: &SourceMap) -> Result<String, serde_json::Error> {
        serde_json::to_string(&JsonDiagnostic::from_diagnostic(self, sources))
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: Option<String>,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, sources: &SourceMap) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let files = sources.files();
        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let start = files.location(label.file_id, label.range.start).ok()?;
                let end = files.location(label.file_id, label.range.end).ok()?;
                Some(JsonLabel {
                    file: sources.name(label.file_id).to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()).filter(|m| !m.is_empty()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a CheckError
pub fn error_code(error: &CheckError) -> ErrorCode {
    use CheckError::*;

    match error {
        Duplicate { .. } => ErrorCode("E3001"),
        Undefined { .. } => ErrorCode("E3002"),
        NotAType { .. } => ErrorCode("E3003"),
        NotExported { .. } => ErrorCode("E3004"),
        UnresolvedImport { .. } => ErrorCode("E3005"),
        InvalidRecursiveType { .. } => ErrorCode("E3006"),
        InvalidInterface { .. } => ErrorCode("E3007"),
        InvalidReceiver { .. } => ErrorCode("E3008"),
        DuplicateMethod { .. } => ErrorCode("E3009"),
        DuplicateField { .. } => ErrorCode("E3010"),
        PackageMismatch { .. } => ErrorCode("E3011"),
    }
}

/// Diagnostics for every error a failed load carries. Errors without
/// source positions yield none.
pub fn load_diagnostics(error: &LoadError) -> Vec<Diagnostic> {
    match error {
        LoadError::Parse(failure) => failure
            .errors
            .iter()
            .map(|(file, err)| Diagnostic::from_parse_error(err, *file))
            .collect(),
        LoadError::TypeCheck(failure) => failure
            .errors
            .iter()
            .map(Diagnostic::from_check_error)
            .collect(),
        LoadError::Io { .. } | LoadError::NoSourceFiles { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;
    use termcolor::NoColor;

    fn sources() -> SourceMap {
        let mut sources = SourceMap::new();
        sources.add("rdr.go", "package p\n\ntype R interface {\n\tGet() Missing\n}\n");
        sources
    }

    fn undefined() -> CheckError {
        CheckError::Undefined {
            name: "Missing".to_string(),
            location: Location::new(0, Span::new(37, 44, 4, 8)),
        }
    }

    #[test]
    fn test_check_error_codes() {
        let diag = Diagnostic::from_check_error(&undefined());
        assert_eq!(diag.code(), Some(ErrorCode("E3002")));
        assert_eq!(diag.message(), "undefined: Missing");
        assert_eq!(diag.inner().severity, Severity::Error);
    }

    #[test]
    fn test_duplicate_has_secondary_label() {
        let error = CheckError::Duplicate {
            name: "R".to_string(),
            original: Some(Location::new(0, Span::new(16, 17, 3, 6))),
            duplicate: Location::new(0, Span::new(37, 40, 4, 8)),
        };
        let diag = Diagnostic::from_check_error(&error);
        assert_eq!(diag.inner().labels.len(), 2);
        assert_eq!(diag.inner().labels[1].style, LabelStyle::Secondary);
    }

    #[test]
    fn test_parse_error_suggestion_becomes_help() {
        let error = ParseError::unsupported("generic type aliases", Span::new(18, 19, 3, 7))
            .with_suggestion("declare 'Vec' as a defined type");
        let diag = Diagnostic::from_parse_error(&error, 0);
        assert_eq!(diag.code(), Some(ErrorCode("E1004")));
        assert!(diag.inner().notes[0].starts_with("help: "));
    }

    #[test]
    fn test_json_output() {
        let json = Diagnostic::from_check_error(&undefined())
            .to_json(&sources())
            .unwrap();
        let parsed: JsonDiagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("E3002"));
        assert_eq!(parsed.labels.len(), 1);
        assert_eq!(parsed.labels[0].file, "rdr.go");
        assert_eq!(parsed.labels[0].start_line, 4);
        assert_eq!(parsed.labels[0].start_column, 8);
        assert_eq!(parsed.labels[0].style, "primary");
    }

    #[test]
    fn test_terminal_rendering() {
        let mut out = NoColor::new(Vec::new());
        Diagnostic::from_check_error(&undefined())
            .emit_to(&mut out, &sources())
            .unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("error[E3002]: undefined: Missing"));
        assert!(text.contains("rdr.go:4:8"));
    }
}
