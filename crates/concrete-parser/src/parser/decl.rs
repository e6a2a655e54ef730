//! Declaration parsing

use super::guards::LoopGuard;
use super::types::{parse_signature, parse_type, parse_type_params};
use super::{skim, ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

/// Parse `package name`.
pub fn parse_package_clause(parser: &mut Parser) -> Result<Ident, ParseError> {
    parser.expect(Token::Package)?;
    let name = parser.expect_ident()?;
    if name.is_blank() {
        return Err(ParseError::invalid_syntax(
            "invalid package name _",
            name.span,
        ));
    }
    parser.expect_semicolon()?;
    Ok(name)
}

/// Parse an import declaration, single or grouped.
pub fn parse_import_decl(parser: &mut Parser) -> Result<Vec<ImportSpec>, ParseError> {
    parser.expect(Token::Import)?;
    parse_group(parser, "import_specs", parse_import_spec)
}

fn parse_import_spec(parser: &mut Parser) -> Result<ImportSpec, ParseError> {
    let start = parser.current_span();

    let name = match parser.current() {
        Token::Dot => {
            parser.advance();
            ImportName::Dot
        }
        Token::Identifier(_) => ImportName::Named(parser.expect_ident()?),
        _ => ImportName::Default,
    };

    let path = match parser.current() {
        Token::StringLiteral(path) => path.clone(),
        _ => return Err(parser.unexpected_token(&[Token::StringLiteral(String::new())])),
    };
    let path_span = parser.current_span();
    parser.advance();

    if path.is_empty() {
        return Err(ParseError::invalid_syntax("empty import path", path_span));
    }

    Ok(ImportSpec {
        name,
        path,
        span: parser.span_from(start),
    })
}

/// Parse one top-level declaration after the import block.
pub fn parse_top_level_decl(parser: &mut Parser) -> Result<Decl, ParseError> {
    match parser.current() {
        Token::Const => {
            parser.advance();
            Ok(Decl::Const(parse_group(parser, "const_specs", parse_const_spec)?))
        }
        Token::Var => {
            parser.advance();
            Ok(Decl::Var(parse_group(parser, "var_specs", parse_var_spec)?))
        }
        Token::Type => {
            parser.advance();
            Ok(Decl::Type(parse_group(parser, "type_specs", parse_type_spec)?))
        }
        Token::Func => Ok(Decl::Func(parse_func_decl(parser)?)),
        Token::Import => Err(ParseError::invalid_syntax(
            "imports must appear before other declarations",
            parser.current_span(),
        )),
        _ => Err(parser
            .unexpected_token(&[Token::Const, Token::Var, Token::Type, Token::Func])
            .with_suggestion("non-declaration statement outside function body")),
    }
}

/// Parse either a single spec or a parenthesized group of specs, followed
/// by the declaration's terminator.
fn parse_group<T>(
    parser: &mut Parser,
    name: &'static str,
    mut parse_spec: impl FnMut(&mut Parser) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    let mut specs = Vec::new();

    if parser.check(&Token::LeftParen) {
        parser.advance();
        let mut guard = LoopGuard::new(name);
        while !parser.check(&Token::RightParen) {
            guard.check()?;
            if parser.check(&Token::Semicolon) {
                parser.advance();
                continue;
            }
            specs.push(parse_spec(parser)?);
            parser.expect_semicolon()?;
        }
        parser.expect(Token::RightParen)?;
    } else {
        specs.push(parse_spec(parser)?);
    }

    parser.expect_semicolon()?;
    Ok(specs)
}

fn parse_ident_list(parser: &mut Parser) -> Result<Vec<Ident>, ParseError> {
    let mut names = vec![parser.expect_ident()?];
    let mut guard = LoopGuard::new("identifier_list");
    while parser.check(&Token::Comma) {
        guard.check()?;
        parser.advance();
        names.push(parser.expect_ident()?);
    }
    Ok(names)
}

/// `a, b T = x, y`; in a group both type and values may be omitted.
fn parse_const_spec(parser: &mut Parser) -> Result<ValueSpec, ParseError> {
    let start = parser.current_span();
    let names = parse_ident_list(parser)?;

    let ty = if parser.check_any(&[Token::Equal, Token::Semicolon, Token::RightParen]) {
        None
    } else {
        Some(parse_type(parser)?)
    };

    let values = if parser.check(&Token::Equal) {
        parser.advance();
        skim::skim_expr_list(parser)?
    } else if ty.is_some() {
        return Err(parser.unexpected_token(&[Token::Equal]));
    } else {
        Vec::new()
    };

    Ok(ValueSpec {
        names,
        ty,
        values,
        span: parser.span_from(start),
    })
}

/// `a, b T`, `a, b T = x, y` or `a, b = x, y`.
fn parse_var_spec(parser: &mut Parser) -> Result<ValueSpec, ParseError> {
    let start = parser.current_span();
    let names = parse_ident_list(parser)?;

    let ty = if parser.check(&Token::Equal) {
        None
    } else {
        Some(parse_type(parser)?)
    };

    let values = if parser.check(&Token::Equal) {
        parser.advance();
        skim::skim_expr_list(parser)?
    } else {
        Vec::new()
    };

    Ok(ValueSpec {
        names,
        ty,
        values,
        span: parser.span_from(start),
    })
}

/// `Name T`, `Name[P C] T` or `Name = T`.
fn parse_type_spec(parser: &mut Parser) -> Result<TypeSpec, ParseError> {
    let start = parser.current_span();
    let name = parser.expect_ident()?;

    let type_params = if parser.check(&Token::LeftBracket) && starts_type_parameters(parser) {
        parse_type_params(parser)?
    } else {
        Vec::new()
    };

    let alias = parser.check(&Token::Equal);
    if alias {
        if !type_params.is_empty() {
            return Err(ParseError::unsupported("generic type aliases", parser.current_span())
                .with_suggestion(format!("declare '{}' as a defined type", name.name)));
        }
        parser.advance();
    }

    let ty = parse_type(parser)?;

    Ok(TypeSpec {
        name,
        type_params,
        alias,
        ty,
        span: parser.span_from(start),
    })
}

/// Distinguish `type A[T any] ...` from the array type in `type A [N]int`.
fn starts_type_parameters(parser: &Parser) -> bool {
    matches!(parser.peek(), Some(Token::Identifier(_)))
        && matches!(
            parser.peek_nth(2),
            Some(
                Token::Identifier(_)
                    | Token::Interface
                    | Token::Func
                    | Token::Map
                    | Token::Chan
                    | Token::Struct
                    | Token::LeftBracket
                    | Token::Comma
                    | Token::Tilde
            )
        )
}

/// `func [receiver] Name signature [body]`.
fn parse_func_decl(parser: &mut Parser) -> Result<FuncDecl, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Func)?;

    let receiver = if parser.check(&Token::LeftParen) {
        Some(parse_receiver(parser)?)
    } else {
        None
    };

    let name = parser.expect_ident()?;
    let type_params = if parser.check(&Token::LeftBracket) {
        if receiver.is_some() {
            return Err(ParseError::invalid_syntax(
                "methods cannot have type parameters",
                parser.current_span(),
            ));
        }
        parse_type_params(parser)?
    } else {
        Vec::new()
    };
    let signature = parse_signature(parser)?;

    let has_body = parser.check(&Token::LeftBrace);
    if has_body {
        skim::skip_block(parser)?;
    }
    let span = parser.span_from(start);
    parser.expect_semicolon()?;

    Ok(FuncDecl {
        receiver,
        name,
        type_params,
        signature,
        has_body,
        span,
    })
}

/// `(t *T)`, `(T)`, `(*T)`, `(l *List[T])`.
fn parse_receiver(parser: &mut Parser) -> Result<Receiver, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::LeftParen)?;

    let name = match (parser.current(), parser.peek()) {
        (Token::Identifier(_), Some(Token::Identifier(_) | Token::Star | Token::LeftParen)) => {
            Some(parser.expect_ident()?)
        }
        _ => None,
    };

    let mut parens = 0usize;
    let mut guard = LoopGuard::new("receiver_parens");
    while parser.check(&Token::LeftParen) {
        guard.check()?;
        parser.advance();
        parens += 1;
    }

    let pointer = parser.check(&Token::Star);
    if pointer {
        parser.advance();
    }
    let base = parser.expect_ident()?;

    let mut type_args = Vec::new();
    if parser.check(&Token::LeftBracket) {
        parser.advance();
        let mut guard = LoopGuard::new("receiver_type_parameters");
        while !parser.check(&Token::RightBracket) {
            guard.check()?;
            type_args.push(parser.expect_ident()?);
            if !parser.check(&Token::RightBracket) {
                parser.expect(Token::Comma)?;
            }
        }
        parser.expect(Token::RightBracket)?;
    }
    if parser.check(&Token::Dot) {
        return Err(ParseError::invalid_syntax(
            "cannot define new methods on non-local type",
            parser.current_span(),
        ));
    }

    for _ in 0..parens {
        parser.expect(Token::RightParen)?;
    }
    if parser.check(&Token::Comma) {
        parser.advance();
    }
    parser.expect(Token::RightParen)?;

    Ok(Receiver {
        name,
        pointer,
        base,
        type_args,
        span: parser.span_from(start),
    })
}
