//! Parse error types and error reporting

use crate::lexer::LexError;
use crate::token::{Span, Token};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,

    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken {
        expected: Vec<Token>,
        found: Token,
    },

    /// Unexpected end of file
    UnexpectedEof {
        expected: Vec<Token>,
    },

    /// Invalid syntax
    InvalidSyntax {
        reason: String,
    },

    /// Valid Go the tool does not handle (generic type aliases)
    Unsupported {
        feature: String,
    },

    /// A parameter list mixes named and unnamed entries
    MixedParameters,

    /// Tokenization failed
    Lex(LexError),

    /// Parser exceeded iteration/depth/size limit
    ParserLimitExceeded {
        message: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.span.line, self.span.column, self.message
        )?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            span: err.span(),
            message: err.to_string(),
            kind: ParseErrorKind::Lex(err),
            suggestion: None,
        }
    }
}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: Vec<Token>, found: Token, span: Span) -> Self {
        let message = match expected.as_slice() {
            [] => format!("unexpected {}", found),
            [one] => format!("expected {}, found {}", describe(one), found),
            many => format!("expected one of {}, found {}", join_tokens(many), found),
        };

        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(expected: Vec<Token>, span: Span) -> Self {
        let message = match expected.as_slice() {
            [] => "unexpected end of file".to_string(),
            [one] => format!("unexpected end of file, expected {}", describe(one)),
            many => format!("unexpected end of file, expected one of {}", join_tokens(many)),
        };

        Self {
            kind: ParseErrorKind::UnexpectedEof { expected },
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: reason.clone(),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
            suggestion: None,
        }
    }

    /// Create an "unsupported construct" error.
    pub fn unsupported(feature: impl Into<String>, span: Span) -> Self {
        let feature = feature.into();
        Self {
            message: format!("{} are not supported", feature),
            kind: ParseErrorKind::Unsupported { feature },
            span,
            suggestion: None,
        }
    }

    /// Create a "mixed named and unnamed parameters" error.
    pub fn mixed_parameters(span: Span) -> Self {
        Self {
            kind: ParseErrorKind::MixedParameters,
            span,
            message: "mixed named and unnamed parameters".to_string(),
            suggestion: Some("name every parameter or none of them".to_string()),
        }
    }

    /// Create a "parser limit exceeded" error.
    pub fn parser_limit_exceeded(message: impl Into<String>, span: Span) -> Self {
        let message = message.into();
        Self {
            kind: ParseErrorKind::ParserLimitExceeded {
                message: message.clone(),
            },
            span,
            message: format!("parser limit exceeded: {}", message),
            suggestion: None,
        }
    }

    /// Add a suggestion to this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Name a token kind in an "expected ..." message.
fn describe(token: &Token) -> String {
    match token {
        Token::Identifier(_) => "identifier".to_string(),
        Token::StringLiteral(_) => "string literal".to_string(),
        Token::Semicolon => "';' or newline".to_string(),
        other => other.to_string(),
    }
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(describe)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = ParseError::unexpected_token(
            vec![Token::RightParen],
            Token::Comma,
            Span::new(4, 5, 1, 5),
        );
        assert_eq!(err.message, "expected ), found ,");
        assert_eq!(err.to_string(), "Parse error at 1:5: expected ), found ,");
    }

    #[test]
    fn test_expected_identifier_is_described_by_kind() {
        let err = ParseError::unexpected_token(
            vec![Token::Identifier(String::new())],
            Token::LeftParen,
            Span::default(),
        );
        assert_eq!(err.message, "expected identifier, found (");
    }

    #[test]
    fn test_unsupported_message() {
        let err = ParseError::unsupported("generic type aliases", Span::default());
        assert_eq!(err.message, "generic type aliases are not supported");
    }

    #[test]
    fn test_display_with_suggestion() {
        let err = ParseError::mixed_parameters(Span::new(0, 1, 2, 7));
        let text = err.to_string();
        assert!(text.starts_with("Parse error at 2:7: mixed named and unnamed parameters"));
        assert!(text.contains("Suggestion: name every parameter"));
    }

    #[test]
    fn test_from_lex_error() {
        let lex = LexError::UnterminatedString {
            span: Span::new(3, 9, 1, 4),
        };
        let err = ParseError::from(lex.clone());
        assert_eq!(err.span, lex.span());
        assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
    }
}
