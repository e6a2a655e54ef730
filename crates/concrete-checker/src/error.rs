//! Error types for package loading and declaration checking
//!
//! Provides structured error types with source locations for reporting
//! binding errors and load failures.

use crate::source::{FileId, SourceMap};
use concrete_parser::{ParseError, Span};
use concrete_types::TypeError;
use std::path::PathBuf;
use thiserror::Error;

/// A position inside one of the files of a `SourceMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: FileId,
    pub span: Span,
}

impl Location {
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }
}

/// Errors found while binding the declarations of a package
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckError {
    /// Two declarations of one name in the same scope
    #[error("{name} redeclared in this block")]
    Duplicate {
        name: String,
        original: Option<Location>,
        duplicate: Location,
    },

    /// Reference to a name that is not declared
    #[error("undefined: {name}")]
    Undefined { name: String, location: Location },

    /// A non-type name used as a type
    #[error("{name} is not a type")]
    NotAType { name: String, location: Location },

    /// Qualified reference to an unexported member of another package
    #[error("name {name} not exported by package {package}")]
    NotExported {
        package: String,
        name: String,
        location: Location,
    },

    /// An import path that cannot be loaded
    #[error("could not import {path}: {reason}")]
    UnresolvedImport {
        path: String,
        reason: String,
        location: Location,
    },

    /// A type that contains itself
    #[error("invalid recursive type: {cycle}")]
    InvalidRecursiveType { cycle: String, location: Location },

    /// An interface whose method set cannot be formed
    #[error("invalid interface {name}: {error}")]
    InvalidInterface {
        name: String,
        error: TypeError,
        location: Location,
    },

    /// A method declared on a type it may not be declared on
    #[error("invalid receiver type {name}: {reason}")]
    InvalidReceiver {
        name: String,
        reason: String,
        location: Location,
    },

    /// A method name declared twice for one type or interface
    #[error("duplicate method {method} for {owner}")]
    DuplicateMethod {
        owner: String,
        method: String,
        location: Location,
    },

    /// A struct field name declared twice
    #[error("duplicate field {name}")]
    DuplicateField { name: String, location: Location },

    /// Files of one directory that declare different packages
    #[error("found packages {expected} and {found}")]
    PackageMismatch {
        expected: String,
        found: String,
        location: Location,
    },
}

impl CheckError {
    /// Primary location of the error.
    pub fn location(&self) -> Location {
        match self {
            CheckError::Duplicate { duplicate, .. } => *duplicate,
            CheckError::Undefined { location, .. }
            | CheckError::NotAType { location, .. }
            | CheckError::NotExported { location, .. }
            | CheckError::UnresolvedImport { location, .. }
            | CheckError::InvalidRecursiveType { location, .. }
            | CheckError::InvalidInterface { location, .. }
            | CheckError::InvalidReceiver { location, .. }
            | CheckError::DuplicateMethod { location, .. }
            | CheckError::DuplicateField { location, .. }
            | CheckError::PackageMismatch { location, .. } => *location,
        }
    }
}

/// Parse errors of a package, with the sources they point into.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub sources: SourceMap,
    pub errors: Vec<(FileId, ParseError)>,
}

/// Check errors of a package, with the sources they point into.
#[derive(Debug, Clone)]
pub struct CheckFailure {
    pub sources: SourceMap,
    pub errors: Vec<CheckError>,
}

impl ParseFailure {
    /// One-line summary: the first error as `file:line:col: message`.
    pub fn summary(&self) -> String {
        let Some((file, first)) = self.errors.first() else {
            return "parse failed".to_string();
        };
        summarize(
            &format!(
                "{}:{}:{}: {}",
                self.sources.name(*file),
                first.span.line,
                first.span.column,
                first.message
            ),
            self.errors.len(),
        )
    }
}

impl CheckFailure {
    /// One-line summary: the first error as `file:line:col: message`.
    pub fn summary(&self) -> String {
        let Some(first) = self.errors.first() else {
            return "type check failed".to_string();
        };
        let location = first.location();
        summarize(
            &format!(
                "{}:{}:{}: {}",
                self.sources.name(location.file),
                location.span.line,
                location.span.column,
                first
            ),
            self.errors.len(),
        )
    }
}

fn summarize(first: &str, count: usize) -> String {
    match count {
        0 | 1 => first.to_string(),
        2 => format!("{} (and 1 more error)", first),
        n => format!("{} (and {} more errors)", first, n - 1),
    }
}

/// Errors that can occur while loading a package
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no Go source files in {}", dir.display())]
    NoSourceFiles { dir: PathBuf },

    #[error("{}", .0.summary())]
    Parse(ParseFailure),

    #[error("{}", .0.summary())]
    TypeCheck(CheckFailure),
}

impl LoadError {
    /// Sources the error points into, if it carries any.
    pub fn sources(&self) -> Option<&SourceMap> {
        match self {
            LoadError::Parse(failure) => Some(&failure.sources),
            LoadError::TypeCheck(failure) => Some(&failure.sources),
            LoadError::Io { .. } | LoadError::NoSourceFiles { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> SourceMap {
        let mut sources = SourceMap::new();
        sources.add("rdr.go", "package temperature\n");
        sources
    }

    #[test]
    fn test_check_failure_summary() {
        let failure = CheckFailure {
            sources: sources(),
            errors: vec![
                CheckError::Undefined {
                    name: "Celsius".to_string(),
                    location: Location::new(0, Span::new(10, 17, 3, 9)),
                },
                CheckError::Undefined {
                    name: "Kelvin".to_string(),
                    location: Location::new(0, Span::new(20, 26, 4, 9)),
                },
            ],
        };
        assert_eq!(
            failure.summary(),
            "rdr.go:3:9: undefined: Celsius (and 1 more error)"
        );
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::NoSourceFiles {
            dir: PathBuf::from("/tmp/empty"),
        };
        assert_eq!(err.to_string(), "no Go source files in /tmp/empty");
        assert!(err.sources().is_none());
    }
}
