//! Error types for stub generation
//!
//! Every stage of the pipeline fails with one `ConcreteError` variant, so
//! callers can tell a missing symbol from a symbol of the wrong kind, and
//! loader failures from output failures.

use concrete_checker::{CheckFailure, Diagnostic, LoadError, ParseFailure, SourceMap};
use concrete_types::TypeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while generating an implementation
#[derive(Debug, Error)]
pub enum ConcreteError {
    /// A source file is not valid Go
    #[error("{}", .0.summary())]
    Parse(ParseFailure),

    /// The package does not type-check
    #[error("{}", .0.summary())]
    TypeCheck(CheckFailure),

    /// Reading the package failed
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no Go source files in {}", dir.display())]
    NoSourceFiles { dir: PathBuf },

    /// No package-scope symbol has the requested name
    #[error("could not find interface '{name}' in package {package}")]
    NotFound { name: String, package: String },

    /// The symbol exists but is not an interface
    #[error("'{name}' is a {kind}, not an interface")]
    NotAnInterface { name: String, kind: String },

    /// The interface has type parameters, or embeds an instantiation
    #[error("cannot implement generic interface '{name}': {type_name} has type parameters")]
    GenericInterface { name: String, type_name: String },

    /// The interface's method set cannot be formed
    #[error("invalid interface '{name}': {source}")]
    InvalidInterface {
        name: String,
        #[source]
        source: TypeError,
    },

    /// Two methods of one name in a flattened method set
    #[error("interface '{interface}' has conflicting methods named {method}")]
    DuplicateMethod { interface: String, method: String },

    /// The concrete type name is already declared in the destination
    #[error("implementation '{name}' already exists ({kind})")]
    AlreadyExists { name: String, kind: String },

    /// The destination is not the interface's package
    #[error("cannot generate into package {requested}: only the interface's package {package} is supported")]
    UnsupportedCrossPackage { requested: String, package: String },

    /// Writing the generated text failed
    #[error("writing {target}: {source}")]
    Render {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// A type name template that cannot be expanded
    #[error("invalid name template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// A generated name that is not a usable Go identifier
    #[error("invalid type name {name:?}: {reason}")]
    InvalidTypeName { name: String, reason: String },
}

impl From<LoadError> for ConcreteError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Parse(failure) => ConcreteError::Parse(failure),
            LoadError::TypeCheck(failure) => ConcreteError::TypeCheck(failure),
            LoadError::Io { path, source } => ConcreteError::Io { path, source },
            LoadError::NoSourceFiles { dir } => ConcreteError::NoSourceFiles { dir },
        }
    }
}

impl ConcreteError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ConcreteError::Parse(_) => "parse",
            ConcreteError::TypeCheck(_) => "type_check",
            ConcreteError::Io { .. } => "io",
            ConcreteError::NoSourceFiles { .. } => "no_source_files",
            ConcreteError::NotFound { .. } => "not_found",
            ConcreteError::NotAnInterface { .. } => "not_an_interface",
            ConcreteError::GenericInterface { .. } => "generic_interface",
            ConcreteError::InvalidInterface { .. } => "invalid_interface",
            ConcreteError::DuplicateMethod { .. } => "duplicate_method",
            ConcreteError::AlreadyExists { .. } => "already_exists",
            ConcreteError::UnsupportedCrossPackage { .. } => "unsupported_cross_package",
            ConcreteError::Render { .. } => "render",
            ConcreteError::InvalidTemplate { .. } => "invalid_template",
            ConcreteError::InvalidTypeName { .. } => "invalid_type_name",
        }
    }

    /// Sources the error points into, if it carries any.
    pub fn sources(&self) -> Option<&SourceMap> {
        match self {
            ConcreteError::Parse(failure) => Some(&failure.sources),
            ConcreteError::TypeCheck(failure) => Some(&failure.sources),
            _ => None,
        }
    }

    /// Source diagnostics for parse and type-check failures. Other errors
    /// have no source position and yield nothing.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            ConcreteError::Parse(failure) => failure
                .errors
                .iter()
                .map(|(file, err)| Diagnostic::from_parse_error(err, *file))
                .collect(),
            ConcreteError::TypeCheck(failure) => failure
                .errors
                .iter()
                .map(Diagnostic::from_check_error)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_not_an_interface_differ() {
        let missing = ConcreteError::NotFound {
            name: "Rdr".to_string(),
            package: "temperature".to_string(),
        };
        let wrong = ConcreteError::NotAnInterface {
            name: "Celsius".to_string(),
            kind: "float64".to_string(),
        };
        assert_eq!(missing.kind(), "not_found");
        assert_eq!(wrong.kind(), "not_an_interface");
        assert_eq!(
            missing.to_string(),
            "could not find interface 'Rdr' in package temperature"
        );
        assert_eq!(wrong.to_string(), "'Celsius' is a float64, not an interface");
    }

    #[test]
    fn test_load_error_conversion() {
        let err: ConcreteError = LoadError::NoSourceFiles {
            dir: PathBuf::from("/tmp/empty"),
        }
        .into();
        assert!(matches!(err, ConcreteError::NoSourceFiles { .. }));
        assert!(err.sources().is_none());
        assert!(err.diagnostics().is_empty());
    }
}
