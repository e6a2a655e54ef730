//! Parser for Go source files
//!
//! This module implements a recursive descent parser that transforms the
//! token stream from the lexer into a declaration-level syntax tree.
//! Function bodies and initializer expressions are skipped with balanced
//! token scanning.

pub mod decl;
pub mod error;
pub mod guards;
pub mod recovery;
pub mod skim;
pub mod types;

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Parser state for Go source files.
///
/// Recursive descent with arbitrary lookahead over a pre-tokenized input.
pub struct Parser<'a> {
    /// Original source, used to capture skipped expression text
    source: &'a str,

    /// Pre-tokenized input, always terminated by `Token::Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,

    /// Current type-expression nesting depth
    pub(crate) depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source code.
    pub fn new(source: &'a str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;

        Ok(Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            depth: 0,
        })
    }

    /// Parse the entire source file.
    ///
    /// Returns the file on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<SourceFile, Vec<ParseError>> {
        let start_span = self.current_span();

        let package = match decl::parse_package_clause(&mut self) {
            Ok(package) => package,
            // Without a package clause nothing else is meaningful
            Err(err) => return Err(vec![err]),
        };

        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            let before = self.pos;
            match decl::parse_import_decl(&mut self) {
                Ok(specs) => imports.extend(specs),
                Err(err) => {
                    self.errors.push(err);
                    self.sync_to_declaration(before);
                }
            }
        }

        let mut decls = Vec::new();
        while !self.at_eof() {
            if self.check(&Token::Semicolon) {
                self.advance();
                continue;
            }
            let before = self.pos;
            match decl::parse_top_level_decl(&mut self) {
                Ok(decl) => decls.push(decl),
                Err(err) => {
                    self.errors.push(err);
                    self.sync_to_declaration(before);
                }
            }
        }

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let span = start_span.merge(&self.current_span());
        Ok(SourceFile {
            package,
            imports,
            decls,
            span,
        })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    /// Peek `n` tokens ahead of the current one.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        if self.pos == 0 {
            self.current_span()
        } else {
            self.tokens[self.pos - 1].1
        }
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if the current token matches any of the given kinds.
    pub fn check_any(&self, expected: &[Token]) -> bool {
        expected.iter().any(|tok| self.check(tok))
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume an identifier.
    pub fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let span = self.current_span();
        match self.current() {
            Token::Identifier(name) => {
                let ident = Ident::new(name.clone(), span);
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    /// Consume a statement terminator.
    ///
    /// A semicolon may be omitted before a closing `)` or `}`.
    pub fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        match self.current() {
            Token::Semicolon => {
                self.advance();
                Ok(())
            }
            Token::RightParen | Token::RightBrace | Token::Eof => Ok(()),
            _ => Err(self.unexpected_token(&[Token::Semicolon])),
        }
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Create an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Source text covered by `span`.
    pub fn source_text(&self, span: Span) -> &'a str {
        span.slice(self.source)
    }

    /// Span from `start` through the most recently consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        start.merge(&self.previous_span())
    }

    /// Synchronize to the next top-level declaration after an error.
    fn sync_to_declaration(&mut self, failed_at: usize) {
        recovery::sync_to_declaration(self, failed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_new() {
        let parser = Parser::new("package main").unwrap();
        assert!(matches!(parser.current(), Token::Package));
    }

    #[test]
    fn test_parser_advance() {
        let mut parser = Parser::new("package main").unwrap();
        let tok = parser.advance();
        assert!(matches!(tok, Token::Package));
        assert!(matches!(parser.current(), Token::Identifier(_)));
    }

    #[test]
    fn test_parser_at_eof() {
        let parser = Parser::new("").unwrap();
        assert!(parser.at_eof());
    }

    #[test]
    fn test_advance_stops_at_eof() {
        let mut parser = Parser::new("").unwrap();
        parser.advance();
        parser.advance();
        assert!(parser.at_eof());
    }

    #[test]
    fn test_parser_peek() {
        let parser = Parser::new("package main").unwrap();
        assert!(matches!(parser.peek(), Some(Token::Identifier(_))));
        assert!(matches!(parser.peek_nth(2), Some(Token::Semicolon)));
    }

    #[test]
    fn test_missing_package_clause() {
        let errors = Parser::new("type T int").unwrap().parse().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("expected package"));
    }

    #[test]
    fn test_errors_are_collected_across_declarations() {
        let source = "package p\ntype A struct {\n\tx int int\n}\ntype B interface{ M( }\n";
        let errors = Parser::new(source).unwrap().parse().unwrap_err();
        assert!(errors.len() >= 2);
    }
}
