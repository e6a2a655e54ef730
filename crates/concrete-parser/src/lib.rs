//! Lexer and declaration-level parser for Go source files.
//!
//! # Example
//!
//! ```
//! use concrete_parser::parse_source;
//!
//! let file = parse_source("package shapes\n\ntype Shape interface {\n\tArea() float64\n}\n").unwrap();
//! assert_eq!(file.package.name, "shapes");
//! assert_eq!(file.type_specs().count(), 1);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::SourceFile;
pub use lexer::{is_identifier, is_keyword, LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};

/// Tokenize and parse a whole source file.
///
/// Lexer errors are reported as parse errors so callers deal with a single
/// error type.
pub fn parse_source(source: &str) -> Result<SourceFile, Vec<ParseError>> {
    let parser = Parser::new(source)
        .map_err(|errors| errors.into_iter().map(ParseError::from).collect::<Vec<_>>())?;
    parser.parse()
}
