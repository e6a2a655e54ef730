//! Token definitions for Go source files.
//!
//! This module defines all tokens the lexer produces, including keywords,
//! operators, literals, and the automatically inserted semicolons.

use std::fmt;

/// A Go token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords (25 total)
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Literals (source text kept as written, except strings which are decoded)
    IntLiteral(String),
    FloatLiteral(String),
    ImaginaryLiteral(String),
    RuneLiteral(String),
    StringLiteral(String),

    // Identifiers
    Identifier(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    LessLess,
    GreaterGreater,
    AmpCaret,

    // Assignment
    Equal,
    ColonEqual,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    AmpCaretEqual,

    // Logical and comparison
    AmpAmp,
    PipePipe,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Bang,

    // Other
    Arrow, // <- channel send/receive
    PlusPlus,
    MinusMinus,
    Tilde,
    Ellipsis,
    Dot,
    Colon,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,

    // Special
    Eof,
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Break => write!(f, "break"),
            Token::Case => write!(f, "case"),
            Token::Chan => write!(f, "chan"),
            Token::Const => write!(f, "const"),
            Token::Continue => write!(f, "continue"),
            Token::Default => write!(f, "default"),
            Token::Defer => write!(f, "defer"),
            Token::Else => write!(f, "else"),
            Token::Fallthrough => write!(f, "fallthrough"),
            Token::For => write!(f, "for"),
            Token::Func => write!(f, "func"),
            Token::Go => write!(f, "go"),
            Token::Goto => write!(f, "goto"),
            Token::If => write!(f, "if"),
            Token::Import => write!(f, "import"),
            Token::Interface => write!(f, "interface"),
            Token::Map => write!(f, "map"),
            Token::Package => write!(f, "package"),
            Token::Range => write!(f, "range"),
            Token::Return => write!(f, "return"),
            Token::Select => write!(f, "select"),
            Token::Struct => write!(f, "struct"),
            Token::Switch => write!(f, "switch"),
            Token::Type => write!(f, "type"),
            Token::Var => write!(f, "var"),
            Token::IntLiteral(s)
            | Token::FloatLiteral(s)
            | Token::ImaginaryLiteral(s)
            | Token::RuneLiteral(s) => write!(f, "{}", s),
            Token::StringLiteral(s) => write!(f, "{:?}", s),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::LessLess => write!(f, "<<"),
            Token::GreaterGreater => write!(f, ">>"),
            Token::AmpCaret => write!(f, "&^"),
            Token::Equal => write!(f, "="),
            Token::ColonEqual => write!(f, ":="),
            Token::PlusEqual => write!(f, "+="),
            Token::MinusEqual => write!(f, "-="),
            Token::StarEqual => write!(f, "*="),
            Token::SlashEqual => write!(f, "/="),
            Token::PercentEqual => write!(f, "%="),
            Token::AmpEqual => write!(f, "&="),
            Token::PipeEqual => write!(f, "|="),
            Token::CaretEqual => write!(f, "^="),
            Token::LessLessEqual => write!(f, "<<="),
            Token::GreaterGreaterEqual => write!(f, ">>="),
            Token::AmpCaretEqual => write!(f, "&^="),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::EqualEqual => write!(f, "=="),
            Token::BangEqual => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::LessEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEqual => write!(f, ">="),
            Token::Bang => write!(f, "!"),
            Token::Arrow => write!(f, "<-"),
            Token::PlusPlus => write!(f, "++"),
            Token::MinusMinus => write!(f, "--"),
            Token::Tilde => write!(f, "~"),
            Token::Ellipsis => write!(f, "..."),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

impl Token {
    /// Returns true if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Break
                | Token::Case
                | Token::Chan
                | Token::Const
                | Token::Continue
                | Token::Default
                | Token::Defer
                | Token::Else
                | Token::Fallthrough
                | Token::For
                | Token::Func
                | Token::Go
                | Token::Goto
                | Token::If
                | Token::Import
                | Token::Interface
                | Token::Map
                | Token::Package
                | Token::Range
                | Token::Return
                | Token::Select
                | Token::Struct
                | Token::Switch
                | Token::Type
                | Token::Var
        )
    }

    /// Returns true if this token is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::IntLiteral(_)
                | Token::FloatLiteral(_)
                | Token::ImaginaryLiteral(_)
                | Token::RuneLiteral(_)
                | Token::StringLiteral(_)
        )
    }

    /// Returns true if a newline directly after this token ends the statement.
    ///
    /// This is Go's automatic semicolon insertion rule: identifiers, literals,
    /// `break`, `continue`, `fallthrough`, `return`, `++`, `--`, `)`, `]`
    /// and `}` terminate a line.
    pub fn ends_statement(&self) -> bool {
        self.is_literal()
            || matches!(
                self,
                Token::Identifier(_)
                    | Token::Break
                    | Token::Continue
                    | Token::Fallthrough
                    | Token::Return
                    | Token::PlusPlus
                    | Token::MinusMinus
                    | Token::RightParen
                    | Token::RightBracket
                    | Token::RightBrace
            )
    }

    /// Returns true if this token can begin a type expression.
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_)
                | Token::Star
                | Token::LeftBracket
                | Token::LeftParen
                | Token::Func
                | Token::Map
                | Token::Chan
                | Token::Arrow
                | Token::Struct
                | Token::Interface
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge_keeps_leftmost_position() {
        let a = Span::new(10, 14, 2, 3);
        let b = Span::new(2, 5, 1, 3);
        let merged = a.merge(&b);
        assert_eq!(merged, Span::new(2, 14, 1, 3));
    }

    #[test]
    fn test_span_slice() {
        let source = "package main";
        let span = Span::new(8, 12, 1, 9);
        assert_eq!(span.slice(source), "main");
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_ends_statement() {
        assert!(Token::Identifier("x".to_string()).ends_statement());
        assert!(Token::RightParen.ends_statement());
        assert!(Token::Return.ends_statement());
        assert!(!Token::Comma.ends_statement());
        assert!(!Token::LeftBrace.ends_statement());
        assert!(!Token::Func.ends_statement());
    }

    #[test]
    fn test_display_keywords() {
        assert_eq!(Token::Interface.to_string(), "interface");
        assert_eq!(Token::Arrow.to_string(), "<-");
        assert_eq!(Token::LeftBrace.to_string(), "{");
    }
}
