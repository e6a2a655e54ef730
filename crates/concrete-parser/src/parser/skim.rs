//! Balanced token skipping.
//!
//! Function bodies and initializer expressions are never analysed, only
//! stepped over. Skipping tracks `()`, `[]` and `{}` nesting so that
//! function literals and composite literals inside expressions are
//! consumed whole.

use super::guards::LoopGuard;
use super::{ParseError, Parser};
use crate::ast::ExprText;
use crate::token::{Span, Token};

/// Skip a `{ ... }` block, returning its span.
pub fn skip_block(parser: &mut Parser) -> Result<Span, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::LeftBrace)?;

    let mut guard = LoopGuard::new("block_skip");
    let mut depth = 1usize;
    while depth > 0 {
        guard.check()?;
        match parser.current() {
            Token::Eof => {
                return Err(ParseError::unexpected_eof(vec![Token::RightBrace], parser.current_span())
                    .with_suggestion("check for an unclosed '{'"));
            }
            Token::LeftBrace => depth += 1,
            Token::RightBrace => depth -= 1,
            _ => {}
        }
        parser.advance();
    }

    Ok(parser.span_from(start))
}

/// Skim one expression, stopping before a top-level token in `stop`.
pub fn skim_expr(parser: &mut Parser, stop: &[Token]) -> Result<ExprText, ParseError> {
    let start = parser.current_span();
    let start_pos = parser.pos;
    let mut guard = LoopGuard::new("expression_skim");
    let mut nesting: Vec<Token> = Vec::new();

    loop {
        guard.check()?;
        if nesting.is_empty() && parser.check_any(stop) {
            break;
        }
        match parser.current() {
            Token::Eof => {
                return Err(parser.unexpected_token(stop));
            }
            Token::LeftParen => nesting.push(Token::RightParen),
            Token::LeftBracket => nesting.push(Token::RightBracket),
            Token::LeftBrace => nesting.push(Token::RightBrace),
            close @ (Token::RightParen | Token::RightBracket | Token::RightBrace) => {
                match nesting.pop() {
                    Some(expected) if &expected == close => {}
                    Some(expected) => return Err(parser.unexpected_token(&[expected])),
                    None => return Err(parser.unexpected_token(stop)),
                }
            }
            _ => {}
        }
        parser.advance();
    }

    if parser.pos == start_pos {
        return Err(ParseError::invalid_syntax("expected expression", start));
    }

    let span = parser.span_from(start);
    Ok(ExprText {
        text: parser.source_text(span).to_string(),
        span,
    })
}

/// Skim a comma-separated expression list ending at `;`, `)` or `}`.
pub fn skim_expr_list(parser: &mut Parser) -> Result<Vec<ExprText>, ParseError> {
    const STOP: &[Token] = &[Token::Comma, Token::Semicolon, Token::RightParen, Token::RightBrace];

    let mut values = vec![skim_expr(parser, STOP)?];
    let mut guard = LoopGuard::new("expression_list");
    while parser.check(&Token::Comma) {
        guard.check()?;
        parser.advance();
        values.push(skim_expr(parser, STOP)?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_at(source: &str, skip: usize) -> Parser<'_> {
        let mut parser = Parser::new(source).unwrap();
        for _ in 0..skip {
            parser.advance();
        }
        parser
    }

    #[test]
    fn test_skip_nested_block() {
        let mut parser = parser_at("{ if x { y() } else { z := map[int]int{} } } after", 0);
        skip_block(&mut parser).unwrap();
        assert_eq!(parser.current(), &Token::Identifier("after".to_string()));
    }

    #[test]
    fn test_skip_unclosed_block_fails() {
        let mut parser = parser_at("{ x {", 0);
        assert!(skip_block(&mut parser).is_err());
    }

    #[test]
    fn test_skim_expr_list_splits_top_level_commas() {
        let mut parser = parser_at("f(a, b), []int{1, 2}, 3\n", 0);
        let values = skim_expr_list(&mut parser).unwrap();
        let texts: Vec<&str> = values.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, vec!["f(a, b)", "[]int{1, 2}", "3"]);
        assert!(parser.check(&Token::Semicolon));
    }

    #[test]
    fn test_skim_function_literal() {
        let mut parser = parser_at("func() int {\n\treturn 1\n}()\n", 0);
        let values = skim_expr_list(&mut parser).unwrap();
        assert_eq!(values.len(), 1);
        assert!(values[0].text.starts_with("func() int {"));
        assert!(values[0].text.ends_with("}()"));
    }

    #[test]
    fn test_skim_empty_expression_fails() {
        let mut parser = parser_at(", x", 0);
        assert!(skim_expr_list(&mut parser).is_err());
    }

    #[test]
    fn test_skim_mismatched_delimiter_fails() {
        let mut parser = parser_at("(a]", 0);
        assert!(skim_expr(&mut parser, &[Token::Semicolon]).is_err());
    }
}
