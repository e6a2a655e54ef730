//! Abstract Syntax Tree definitions for Go source files.
//!
//! The tree covers the declaration level of a Go file: the package clause,
//! imports, and const/var/type/func declarations with full type
//! expressions. Function bodies and initializer expressions are not
//! modelled; initializers are kept as their source text.

pub mod decl;
pub mod types;

pub use decl::*;
pub use types::*;

use crate::token::Span;

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// True for the blank identifier `_`.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }

    /// True if the identifier starts with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

/// The verbatim source text of an expression the parser skipped over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprText {
    pub text: String,
    pub span: Span,
}

/// A parsed Go source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    pub span: Span,
}

impl SourceFile {
    /// Iterate over every type spec in the file, including grouped ones.
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().flat_map(|decl| match decl {
            Decl::Type(specs) => specs.as_slice(),
            _ => &[],
        })
    }

    /// Iterate over every function and method declaration.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}
