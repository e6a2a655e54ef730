//! Error recovery strategies for the parser.
//!
//! When the parser encounters an error, it uses these strategies to
//! resynchronize and continue parsing to find more errors.

use super::guards::LoopGuard;
use super::Parser;
use crate::token::Token;

/// Synchronize to the next top-level declaration.
///
/// Skips tokens until a declaration keyword starts a new line outside any
/// brace nesting. `failed_at` is the token position where the failed
/// declaration began; at least one token past it is always consumed.
pub fn sync_to_declaration(parser: &mut Parser, failed_at: usize) {
    // Loop guard to prevent infinite loops in recovery itself
    let mut guard = LoopGuard::new("declaration_recovery");

    if parser.pos == failed_at {
        parser.advance();
    }

    let mut brace_depth: i32 = 0;
    while !parser.at_eof() {
        if guard.check().is_err() {
            return;
        }

        let at_line_start = parser.pos > 0 && matches!(parser.tokens[parser.pos - 1].0, Token::Semicolon);

        match parser.current() {
            Token::Func | Token::Type | Token::Var | Token::Const | Token::Import
                if at_line_start && brace_depth <= 0 =>
            {
                return;
            }
            Token::LeftBrace => brace_depth += 1,
            Token::RightBrace => brace_depth -= 1,
            _ => {}
        }
        parser.advance();
    }
}

/// Skip tokens until we find one of the expected tokens.
pub fn skip_until(parser: &mut Parser, expected: &[Token]) {
    let mut guard = LoopGuard::new("skip_until");

    while !parser.at_eof() {
        if guard.check().is_err() {
            return;
        }
        if parser.check_any(expected) {
            return;
        }
        parser.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_stops_at_next_line_declaration() {
        let mut parser = Parser::new("package p\nbogus tokens here\ntype T int\n").unwrap();
        // package p ;
        parser.advance();
        parser.advance();
        parser.advance();
        let failed_at = parser.pos;

        sync_to_declaration(&mut parser, failed_at);

        assert!(matches!(parser.current(), Token::Type));
    }

    #[test]
    fn test_sync_skips_keywords_inside_braces() {
        let source = "package p\nstruct {\nfunc x\n}\nvar v int\n";
        let mut parser = Parser::new(source).unwrap();
        for _ in 0..3 {
            parser.advance();
        }
        let failed_at = parser.pos;

        sync_to_declaration(&mut parser, failed_at);

        assert!(matches!(parser.current(), Token::Var));
    }

    #[test]
    fn test_sync_always_makes_progress() {
        let mut parser = Parser::new("func").unwrap();
        sync_to_declaration(&mut parser, 0);
        assert!(!matches!(parser.current(), Token::Func));
    }

    #[test]
    fn test_skip_until() {
        let mut parser = Parser::new("a b c ) d").unwrap();
        skip_until(&mut parser, &[Token::RightParen]);
        assert!(matches!(parser.current(), Token::RightParen));
    }
}
