//! Integer constant evaluation for array lengths
//!
//! Array lengths are kept as source text by the parser. This module folds
//! the common cases (literals, package constants, `iota`, arithmetic and
//! bit operators) into a number. Anything else stays unevaluated.

use concrete_parser::{Lexer, Token};
use rustc_hash::FxHashMap;

/// Recursion limit for nested expressions and constant chains
const MAX_EVAL_DEPTH: usize = 64;

/// A package-level constant as far as evaluation is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    /// Value expression; for an implicit repetition inside a group this is
    /// the expression of the spec it repeats
    pub expr: Option<String>,
    /// Position of the spec inside its const group
    pub iota: i64,
}

/// Evaluates integer constant expressions against a set of constants.
pub struct ConstEvaluator<'a> {
    consts: &'a FxHashMap<String, ConstDecl>,
    visiting: Vec<String>,
}

impl<'a> ConstEvaluator<'a> {
    pub fn new(consts: &'a FxHashMap<String, ConstDecl>) -> Self {
        Self {
            consts,
            visiting: Vec::new(),
        }
    }

    /// Evaluate `text`, with `iota` bound when inside a const declaration.
    pub fn eval(&mut self, text: &str, iota: Option<i64>) -> Option<i128> {
        if self.visiting.len() > MAX_EVAL_DEPTH {
            return None;
        }
        let tokens: Vec<Token> = Lexer::new(text)
            .tokenize()
            .ok()?
            .into_iter()
            .map(|(token, _)| token)
            .filter(|token| !matches!(token, Token::Semicolon | Token::Eof))
            .collect();

        let mut expr = ExprParser {
            tokens,
            pos: 0,
            iota,
            depth: 0,
        };
        let value = expr.parse_binary(self, 0)?;
        if expr.pos != expr.tokens.len() {
            return None;
        }
        Some(value)
    }

    /// Evaluate an array length: a non-negative constant that fits `u64`.
    pub fn eval_len(&mut self, text: &str) -> Option<u64> {
        self.eval(text, None).and_then(|n| u64::try_from(n).ok())
    }

    fn constant(&mut self, name: &str) -> Option<i128> {
        let consts = self.consts;
        let decl = consts.get(name)?;
        if self.visiting.iter().any(|v| v == name) {
            return None;
        }
        let expr = decl.expr.as_deref()?;
        self.visiting.push(name.to_string());
        let value = self.eval(expr, Some(decl.iota));
        self.visiting.pop();
        value
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    iota: Option<i64>,
    depth: usize,
}

impl ExprParser {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_binary(&mut self, eval: &mut ConstEvaluator, min_prec: u8) -> Option<i128> {
        self.depth += 1;
        if self.depth > MAX_EVAL_DEPTH {
            return None;
        }

        let mut lhs = self.parse_unary(eval)?;
        while let Some(prec) = self.current().and_then(precedence) {
            if prec < min_prec {
                break;
            }
            let op = self.advance()?;
            let rhs = self.parse_binary(eval, prec + 1)?;
            lhs = apply(&op, lhs, rhs)?;
        }

        self.depth -= 1;
        Some(lhs)
    }

    fn parse_unary(&mut self, eval: &mut ConstEvaluator) -> Option<i128> {
        match self.advance()? {
            Token::Minus => self.parse_unary(eval)?.checked_neg(),
            Token::Plus => self.parse_unary(eval),
            Token::Caret => Some(!self.parse_unary(eval)?),
            Token::LeftParen => {
                let value = self.parse_binary(eval, 0)?;
                match self.advance()? {
                    Token::RightParen => Some(value),
                    _ => None,
                }
            }
            Token::IntLiteral(text) => parse_int(&text),
            Token::RuneLiteral(text) => parse_rune(&text),
            Token::Identifier(name) if name == "iota" => self.iota.map(i128::from),
            Token::Identifier(name) if is_integer_type(&name) => {
                // Conversion such as int64(8)
                if self.advance()? != Token::LeftParen {
                    return None;
                }
                let value = self.parse_binary(eval, 0)?;
                match self.advance()? {
                    Token::RightParen => Some(value),
                    _ => None,
                }
            }
            Token::Identifier(name) => eval.constant(&name),
            _ => None,
        }
    }
}

fn precedence(token: &Token) -> Option<u8> {
    match token {
        Token::Star
        | Token::Slash
        | Token::Percent
        | Token::LessLess
        | Token::GreaterGreater
        | Token::Amp
        | Token::AmpCaret => Some(2),
        Token::Plus | Token::Minus | Token::Pipe | Token::Caret => Some(1),
        _ => None,
    }
}

fn apply(op: &Token, lhs: i128, rhs: i128) -> Option<i128> {
    match op {
        Token::Plus => lhs.checked_add(rhs),
        Token::Minus => lhs.checked_sub(rhs),
        Token::Star => lhs.checked_mul(rhs),
        Token::Slash => lhs.checked_div(rhs),
        Token::Percent => lhs.checked_rem(rhs),
        Token::LessLess => {
            let shift = u32::try_from(rhs).ok().filter(|s| *s < 127)?;
            lhs.checked_mul(1i128 << shift)
        }
        Token::GreaterGreater => {
            let shift = u32::try_from(rhs).ok()?;
            Some(if shift >= 127 { lhs.signum().min(0) } else { lhs >> shift })
        }
        Token::Amp => Some(lhs & rhs),
        Token::AmpCaret => Some(lhs & !rhs),
        Token::Pipe => Some(lhs | rhs),
        Token::Caret => Some(lhs ^ rhs),
        _ => None,
    }
}

fn is_integer_type(name: &str) -> bool {
    matches!(
        name,
        "int"
            | "int8"
            | "int16"
            | "int32"
            | "int64"
            | "uint"
            | "uint8"
            | "uint16"
            | "uint32"
            | "uint64"
            | "uintptr"
            | "byte"
            | "rune"
    )
}

/// Parse a Go integer literal: decimal, `0x`, `0o`, `0b`, legacy octal,
/// with optional `_` separators.
fn parse_int(text: &str) -> Option<i128> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    i128::from_str_radix(body, radix).ok()
}

/// Value of a simple rune literal such as `'a'` or `'\n'`.
fn parse_rune(text: &str) -> Option<i128> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let value = match (chars.next()?, chars.next()) {
        (c, None) => c,
        ('\\', Some(escape)) if chars.next().is_none() => match escape {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            _ => return None,
        },
        _ => return None,
    };
    Some(i128::from(u32::from(value)))
}
