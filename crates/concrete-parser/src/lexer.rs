//! Lexer for Go source files.
//!
//! This module implements the lexer using the logos library. It converts
//! source code into a stream of tokens with precise source location
//! information and performs Go's automatic semicolon insertion.

use crate::token::{Span, Token};
use logos::Logos;

/// Logos-based token enum for lexing.
///
/// This enum is used internally by logos for efficient tokenization.
/// It's converted to our main Token enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace other than newlines (skip)
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Whitespace,

    // Newlines drive semicolon insertion
    #[token("\n")]
    Newline,

    // Comments
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment(bool),

    // Keywords (must come before identifiers)
    #[token("break")]
    Break,

    #[token("case")]
    Case,

    #[token("chan")]
    Chan,

    #[token("const")]
    Const,

    #[token("continue")]
    Continue,

    #[token("default")]
    Default,

    #[token("defer")]
    Defer,

    #[token("else")]
    Else,

    #[token("fallthrough")]
    Fallthrough,

    #[token("for")]
    For,

    #[token("func")]
    Func,

    #[token("go")]
    Go,

    #[token("goto")]
    Goto,

    #[token("if")]
    If,

    #[token("import")]
    Import,

    #[token("interface")]
    Interface,

    #[token("map")]
    Map,

    #[token("package")]
    Package,

    #[token("range")]
    Range,

    #[token("return")]
    Return,

    #[token("select")]
    Select,

    #[token("struct")]
    Struct,

    #[token("switch")]
    Switch,

    #[token("type")]
    Type,

    #[token("var")]
    Var,

    // Identifiers (must come after keywords)
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", slice_string)]
    Identifier(String),

    // Numbers with digit separator support
    #[regex(r"0[xX][0-9a-fA-F_]+", slice_string)]
    #[regex(r"0[bB][01_]+", slice_string)]
    #[regex(r"0[oO][0-7_]+", slice_string)]
    #[regex(r"[0-9][0-9_]*", slice_string)]
    IntLiteral(String),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?", slice_string)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+", slice_string)]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?", slice_string)]
    FloatLiteral(String),

    #[regex(r"[0-9][0-9_]*i", slice_string)]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?i", slice_string)]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?i", slice_string)]
    ImaginaryLiteral(String),

    #[regex(r"'([^'\\\n]|\\.)+'", slice_string)]
    RuneLiteral(String),

    // Strings
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    #[regex(r"`[^`]*`", parse_raw_string)]
    StringLiteral(String),

    // Operators (longest match wins)
    #[token("&^=")]
    AmpCaretEqual,

    #[token("<<=")]
    LessLessEqual,

    #[token(">>=")]
    GreaterGreaterEqual,

    #[token("...")]
    Ellipsis,

    #[token("&^")]
    AmpCaret,

    #[token("<<")]
    LessLess,

    #[token(">>")]
    GreaterGreater,

    #[token("+=")]
    PlusEqual,

    #[token("-=")]
    MinusEqual,

    #[token("*=")]
    StarEqual,

    #[token("/=")]
    SlashEqual,

    #[token("%=")]
    PercentEqual,

    #[token("&=")]
    AmpEqual,

    #[token("|=")]
    PipeEqual,

    #[token("^=")]
    CaretEqual,

    #[token(":=")]
    ColonEqual,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("<-")]
    Arrow,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    // Single-character tokens
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Equal,

    #[token("!")]
    Bang,

    #[token("~")]
    Tilde,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

// Helper parsing functions
fn slice_string(lex: &mut logos::Lexer<LogosToken>) -> String {
    lex.slice().to_string()
}

/// Consume a block comment, reporting whether it spanned a newline.
///
/// A block comment containing a newline acts like a newline for semicolon
/// insertion. Unterminated comments swallow the rest of the input and fail.
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> Option<bool> {
    let remainder = lex.remainder();

    if let Some(end) = remainder.find("*/") {
        let has_newline = remainder[..end].contains('\n');
        lex.bump(end + 2);
        Some(has_newline)
    } else {
        lex.bump(remainder.len());
        None
    }
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len() - 1];
    unescape_string(inner)
}

fn parse_raw_string(lex: &mut logos::Lexer<LogosToken>) -> String {
    let s = lex.slice();
    // Carriage returns are discarded from raw string values
    s[1..s.len() - 1].replace('\r', "")
}

/// Decode the escape sequences of an interpreted string literal.
///
/// Returns `None` on a malformed escape.
pub fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next()? {
            'a' => result.push('\u{07}'),
            'b' => result.push('\u{08}'),
            'f' => result.push('\u{0C}'),
            'n' => result.push('\n'),
            'r' => result.push('\r'),
            't' => result.push('\t'),
            'v' => result.push('\u{0B}'),
            '\\' => result.push('\\'),
            '"' => result.push('"'),
            '\'' => result.push('\''),
            'x' => result.push(read_code_point(&mut chars, 2, 16)?),
            'u' => result.push(read_code_point(&mut chars, 4, 16)?),
            'U' => result.push(read_code_point(&mut chars, 8, 16)?),
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                result.push(char::from_u32(value)?);
            }
            _ => return None,
        }
    }

    Some(result)
}

fn read_code_point(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    radix: u32,
) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    char::from_u32(value)
}

/// Returns true if `name` is a valid Go identifier that is not a keyword.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = match chars.next() {
        Some(c) => c == '_' || unicode_xid::UnicodeXID::is_xid_start(c),
        None => false,
    };
    first_ok
        && chars.all(unicode_xid::UnicodeXID::is_xid_continue)
        && !is_keyword(name)
}

/// Returns true if `name` is one of Go's 25 reserved keywords.
pub fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedCharacter { char: char, span: Span },
    UnterminatedString { span: Span },
    UnterminatedComment { span: Span },
    InvalidRune { span: Span },
    InvalidEscape { span: Span },
}

impl LexError {
    /// Source location of the error.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidRune { span }
            | LexError::InvalidEscape { span } => *span,
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();

            // Update line and column based on skipped text
            advance_position(&self.source[last_end..range.start], &mut line, &mut column);

            let span = Span::new(range.start, range.end, line, column);

            match token_result {
                Ok(LogosToken::Newline) | Ok(LogosToken::BlockComment(true)) => {
                    self.insert_semicolon(span);
                }
                Ok(LogosToken::BlockComment(false)) => {}
                Ok(logos_token) => {
                    let token = self.convert_token(logos_token);
                    self.tokens.push((token, span));
                }
                Err(()) => {
                    let error = self.classify_error(range.start, span);
                    self.errors.push(error);
                }
            }

            // Update position for this token's own text
            advance_position(&self.source[range.start..range.end], &mut line, &mut column);
            last_end = range.end;
        }

        advance_position(&self.source[last_end..], &mut line, &mut column);
        let eof_span = Span::new(self.source.len(), self.source.len(), line, column);
        self.insert_semicolon(eof_span);
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    /// Insert an automatic semicolon if the previous token ends a line.
    fn insert_semicolon(&mut self, span: Span) {
        if let Some((last, _)) = self.tokens.last() {
            if last.ends_statement() {
                let at = Span::new(span.start, span.start, span.line, span.column);
                self.tokens.push((Token::Semicolon, at));
            }
        }
    }

    fn classify_error(&self, start: usize, span: Span) -> LexError {
        let rest = &self.source[start..];
        let char = rest.chars().next().unwrap_or('\0');
        match char {
            '"' if has_bad_escape(rest) => LexError::InvalidEscape { span },
            '"' | '`' => LexError::UnterminatedString { span },
            '\'' => LexError::InvalidRune { span },
            '/' if rest.starts_with("/*") => LexError::UnterminatedComment { span },
            _ => LexError::UnexpectedCharacter { char, span },
        }
    }

    fn convert_token(&self, logos_token: LogosToken) -> Token {
        match logos_token {
            LogosToken::Break => Token::Break,
            LogosToken::Case => Token::Case,
            LogosToken::Chan => Token::Chan,
            LogosToken::Const => Token::Const,
            LogosToken::Continue => Token::Continue,
            LogosToken::Default => Token::Default,
            LogosToken::Defer => Token::Defer,
            LogosToken::Else => Token::Else,
            LogosToken::Fallthrough => Token::Fallthrough,
            LogosToken::For => Token::For,
            LogosToken::Func => Token::Func,
            LogosToken::Go => Token::Go,
            LogosToken::Goto => Token::Goto,
            LogosToken::If => Token::If,
            LogosToken::Import => Token::Import,
            LogosToken::Interface => Token::Interface,
            LogosToken::Map => Token::Map,
            LogosToken::Package => Token::Package,
            LogosToken::Range => Token::Range,
            LogosToken::Return => Token::Return,
            LogosToken::Select => Token::Select,
            LogosToken::Struct => Token::Struct,
            LogosToken::Switch => Token::Switch,
            LogosToken::Type => Token::Type,
            LogosToken::Var => Token::Var,
            LogosToken::Identifier(s) => Token::Identifier(s),
            LogosToken::IntLiteral(s) => Token::IntLiteral(s),
            LogosToken::FloatLiteral(s) => Token::FloatLiteral(s),
            LogosToken::ImaginaryLiteral(s) => Token::ImaginaryLiteral(s),
            LogosToken::RuneLiteral(s) => Token::RuneLiteral(s),
            LogosToken::StringLiteral(s) => Token::StringLiteral(s),
            LogosToken::AmpCaretEqual => Token::AmpCaretEqual,
            LogosToken::LessLessEqual => Token::LessLessEqual,
            LogosToken::GreaterGreaterEqual => Token::GreaterGreaterEqual,
            LogosToken::Ellipsis => Token::Ellipsis,
            LogosToken::AmpCaret => Token::AmpCaret,
            LogosToken::LessLess => Token::LessLess,
            LogosToken::GreaterGreater => Token::GreaterGreater,
            LogosToken::PlusEqual => Token::PlusEqual,
            LogosToken::MinusEqual => Token::MinusEqual,
            LogosToken::StarEqual => Token::StarEqual,
            LogosToken::SlashEqual => Token::SlashEqual,
            LogosToken::PercentEqual => Token::PercentEqual,
            LogosToken::AmpEqual => Token::AmpEqual,
            LogosToken::PipeEqual => Token::PipeEqual,
            LogosToken::CaretEqual => Token::CaretEqual,
            LogosToken::ColonEqual => Token::ColonEqual,
            LogosToken::AmpAmp => Token::AmpAmp,
            LogosToken::PipePipe => Token::PipePipe,
            LogosToken::Arrow => Token::Arrow,
            LogosToken::PlusPlus => Token::PlusPlus,
            LogosToken::MinusMinus => Token::MinusMinus,
            LogosToken::EqualEqual => Token::EqualEqual,
            LogosToken::BangEqual => Token::BangEqual,
            LogosToken::LessEqual => Token::LessEqual,
            LogosToken::GreaterEqual => Token::GreaterEqual,
            LogosToken::Plus => Token::Plus,
            LogosToken::Minus => Token::Minus,
            LogosToken::Star => Token::Star,
            LogosToken::Slash => Token::Slash,
            LogosToken::Percent => Token::Percent,
            LogosToken::Amp => Token::Amp,
            LogosToken::Pipe => Token::Pipe,
            LogosToken::Caret => Token::Caret,
            LogosToken::Less => Token::Less,
            LogosToken::Greater => Token::Greater,
            LogosToken::Equal => Token::Equal,
            LogosToken::Bang => Token::Bang,
            LogosToken::Tilde => Token::Tilde,
            LogosToken::Dot => Token::Dot,
            LogosToken::Colon => Token::Colon,
            LogosToken::LeftParen => Token::LeftParen,
            LogosToken::RightParen => Token::RightParen,
            LogosToken::LeftBrace => Token::LeftBrace,
            LogosToken::RightBrace => Token::RightBrace,
            LogosToken::LeftBracket => Token::LeftBracket,
            LogosToken::RightBracket => Token::RightBracket,
            LogosToken::Semicolon => Token::Semicolon,
            LogosToken::Comma => Token::Comma,
            LogosToken::Whitespace
            | LogosToken::LineComment
            | LogosToken::BlockComment(_)
            | LogosToken::Newline => {
                unreachable!("Whitespace, newlines and comments are handled by tokenize")
            }
        }
    }
}

fn advance_position(text: &str, line: &mut u32, column: &mut u32) {
    for c in text.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

/// True when the string literal starting at `rest` is closed on its line but
/// contains an escape `unescape_string` rejects.
fn has_bad_escape(rest: &str) -> bool {
    let line = rest.lines().next().unwrap_or("");
    let mut escaped = false;
    for (i, c) in line.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return unescape_string(&line[1..i]).is_none(),
            _ => escaped = false,
        }
    }
    false
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedCharacter { char, span } => {
                write!(f, "Unexpected character '{}' at {}:{}", char, span.line, span.column)
            }
            LexError::UnterminatedString { span } => {
                write!(f, "Unterminated string at {}:{}", span.line, span.column)
            }
            LexError::UnterminatedComment { span } => {
                write!(f, "Unterminated block comment at {}:{}", span.line, span.column)
            }
            LexError::InvalidRune { span } => {
                write!(f, "Invalid rune literal at {}:{}", span.line, span.column)
            }
            LexError::InvalidEscape { span } => {
                write!(f, "Invalid escape sequence at {}:{}", span.line, span.column)
            }
        }
    }
}

impl std::error::Error for LexError {}
