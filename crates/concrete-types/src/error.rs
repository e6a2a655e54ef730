//! Type model errors

use thiserror::Error;

/// Errors raised while computing properties of types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A named type whose declaration was never resolved
    #[error("undefined type: {name}")]
    UndefinedType {
        /// Type name that was not found
        name: String,
    },

    /// Circular type reference
    #[error("invalid recursive type: {cycle}")]
    CircularReference {
        /// Description of the cycle, e.g. `A -> B -> A`
        cycle: String,
    },

    /// A type used where an interface is required
    #[error("{name} is not an interface ({kind})")]
    NotAnInterface {
        /// Type string of the offending type
        name: String,
        /// Kind of its underlying type
        kind: &'static str,
    },

    /// A type from a package whose declarations are not available
    #[error("{name} is declared in a package without available source")]
    Opaque {
        /// Qualified type name
        name: String,
    },

    /// A generic type, or an instantiation of one, where a method set is
    /// needed
    #[error("{name} has type parameters")]
    Generic {
        /// Type string of the generic type
        name: String,
    },

    /// Two methods with one name but different signatures
    #[error("duplicate method {method}: {first} and {second}")]
    DuplicateMethod {
        /// Method name
        method: String,
        /// Signature seen first
        first: String,
        /// Conflicting signature
        second: String,
    },
}
