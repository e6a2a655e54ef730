//! Type expression parsing

use super::guards::{LoopGuard, MAX_PARSE_DEPTH};
use super::{skim, ParseError, Parser};
use crate::ast::*;
use crate::token::{Span, Token};

/// Parse a type expression.
pub fn parse_type(parser: &mut Parser) -> Result<TypeExpr, ParseError> {
    // Check depth before entering
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::parser_limit_exceeded(
            format!("maximum type nesting depth ({}) exceeded", MAX_PARSE_DEPTH),
            parser.current_span(),
        ));
    }

    // Inner function so `?` can be used while the depth is always restored
    let result = parse_type_inner(parser);

    parser.depth -= 1;
    result
}

fn parse_type_inner(parser: &mut Parser) -> Result<TypeExpr, ParseError> {
    let start = parser.current_span();

    let kind = match parser.current() {
        Token::Identifier(_) => return parse_type_name(parser),

        Token::Star => {
            parser.advance();
            TypeExprKind::Pointer(Box::new(parse_type(parser)?))
        }

        Token::LeftBracket => {
            parser.advance();
            match parser.current() {
                Token::RightBracket => {
                    parser.advance();
                    TypeExprKind::Slice(Box::new(parse_type(parser)?))
                }
                Token::Ellipsis => {
                    return Err(ParseError::invalid_syntax(
                        "array length [...] is only valid in composite literals",
                        parser.current_span(),
                    ));
                }
                _ => {
                    let len = skim::skim_expr(parser, &[Token::RightBracket])?;
                    parser.expect(Token::RightBracket)?;
                    let elem = parse_type(parser)?;
                    TypeExprKind::Array {
                        len,
                        elem: Box::new(elem),
                    }
                }
            }
        }

        Token::Map => {
            parser.advance();
            parser.expect(Token::LeftBracket)?;
            let key = parse_type(parser)?;
            parser.expect(Token::RightBracket)?;
            let value = parse_type(parser)?;
            TypeExprKind::Map {
                key: Box::new(key),
                value: Box::new(value),
            }
        }

        Token::Chan => {
            parser.advance();
            let dir = if parser.check(&Token::Arrow) {
                parser.advance();
                ChanDir::Send
            } else {
                ChanDir::Both
            };
            let elem = parse_type(parser)?;
            TypeExprKind::Chan {
                dir,
                elem: Box::new(elem),
            }
        }

        Token::Arrow => {
            parser.advance();
            parser.expect(Token::Chan)?;
            let elem = parse_type(parser)?;
            TypeExprKind::Chan {
                dir: ChanDir::Recv,
                elem: Box::new(elem),
            }
        }

        Token::Func => {
            parser.advance();
            TypeExprKind::Func(parse_signature(parser)?)
        }

        Token::Struct => TypeExprKind::Struct(parse_struct_body(parser)?),

        Token::Interface => TypeExprKind::Interface(parse_interface_body(parser)?),

        Token::LeftParen => {
            parser.advance();
            let inner = parse_type(parser)?;
            parser.expect(Token::RightParen)?;
            TypeExprKind::Paren(Box::new(inner))
        }

        Token::Tilde => {
            return Err(ParseError::invalid_syntax(
                "~T is only valid in a type constraint",
                start,
            ));
        }

        _ => {
            return Err(parser
                .unexpected_token(&[])
                .with_suggestion("expected a type"));
        }
    };

    Ok(TypeExpr::new(kind, parser.span_from(start)))
}

/// Parse `T`, `pkg.T` or an instantiation `pkg.T[A, B]`.
fn parse_type_name(parser: &mut Parser) -> Result<TypeExpr, ParseError> {
    let start = parser.current_span();
    let first = parser.expect_ident()?;

    let (package, name) = if parser.check(&Token::Dot) {
        parser.advance();
        let name = parser.expect_ident()?;
        (Some(first), name)
    } else {
        (None, first)
    };

    let base = TypeExpr::new(TypeExprKind::Name { package, name }, parser.span_from(start));
    if !parser.check(&Token::LeftBracket) {
        return Ok(base);
    }

    parser.advance();
    let mut args = Vec::new();
    let mut guard = LoopGuard::new("type_arguments");
    while !parser.check(&Token::RightBracket) {
        guard.check()?;
        args.push(parse_type(parser)?);
        if !parser.check(&Token::RightBracket) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightBracket)?;
    if args.is_empty() {
        return Err(ParseError::invalid_syntax(
            "expected type argument list",
            parser.span_from(start),
        ));
    }

    Ok(TypeExpr::new(
        TypeExprKind::Instance {
            base: Box::new(base),
            args,
        },
        parser.span_from(start),
    ))
}

/// Parse a type parameter list: `[K comparable, V any]`.
pub fn parse_type_params(parser: &mut Parser) -> Result<Vec<TypeParam>, ParseError> {
    let list_start = parser.current_span();
    parser.expect(Token::LeftBracket)?;

    let mut params = Vec::new();
    let mut pending: Vec<Ident> = Vec::new();
    let mut guard = LoopGuard::new("type_parameters");
    while !parser.check(&Token::RightBracket) {
        guard.check()?;
        pending.push(parser.expect_ident()?);
        if !parser.check_any(&[Token::Comma, Token::RightBracket]) {
            params.push(TypeParam {
                names: std::mem::take(&mut pending),
                constraint: parse_constraint(parser)?,
            });
        }
        if !parser.check(&Token::RightBracket) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightBracket)?;
    let list_span = parser.span_from(list_start);

    if let Some(ident) = pending.first() {
        return Err(ParseError::invalid_syntax(
            "missing type constraint",
            ident.span.merge(&list_span),
        ));
    }
    if params.is_empty() {
        return Err(ParseError::invalid_syntax(
            "empty type parameter list",
            list_span,
        ));
    }
    Ok(params)
}

/// Parse a type constraint. A lone type without `~` stays a plain type;
/// anything else becomes a `Union`.
pub fn parse_constraint(parser: &mut Parser) -> Result<TypeExpr, ParseError> {
    let start = parser.current_span();
    let mut terms = parse_union(parser)?;
    if terms.len() == 1 && !terms[0].tilde {
        if let Some(term) = terms.pop() {
            return Ok(term.ty);
        }
    }
    Ok(TypeExpr::new(TypeExprKind::Union(terms), parser.span_from(start)))
}

/// `~A | B | ...`
fn parse_union(parser: &mut Parser) -> Result<Vec<TypeTerm>, ParseError> {
    let mut terms = vec![parse_term(parser)?];
    let mut guard = LoopGuard::new("union_terms");
    while parser.check(&Token::Pipe) {
        guard.check()?;
        parser.advance();
        terms.push(parse_term(parser)?);
    }
    Ok(terms)
}

fn parse_term(parser: &mut Parser) -> Result<TypeTerm, ParseError> {
    let tilde = parser.check(&Token::Tilde);
    if tilde {
        parser.advance();
    }
    Ok(TypeTerm {
        tilde,
        ty: parse_type(parser)?,
    })
}

/// True if the token after the `]` matching the `[` `offset` tokens ahead
/// satisfies `follow`. Tells a lone `List[int]` apart from the name of a
/// field or parameter whose type is an array or slice.
fn closes_before(parser: &Parser, offset: usize, follow: impl Fn(&Token) -> bool) -> bool {
    let mut depth = 0usize;
    let mut n = offset;
    while let Some(token) = parser.peek_nth(n) {
        match token {
            Token::LeftBracket => depth += 1,
            Token::RightBracket => {
                depth -= 1;
                if depth == 0 {
                    return parser.peek_nth(n + 1).is_some_and(&follow);
                }
            }
            Token::Eof => return false,
            _ => {}
        }
        n += 1;
    }
    false
}

/// Parse a function signature: parameters and optional results.
pub fn parse_signature(parser: &mut Parser) -> Result<FuncType, ParseError> {
    let start = parser.current_span();

    if parser.check(&Token::LeftBracket) {
        return Err(ParseError::invalid_syntax(
            "function type must have no type parameters",
            start,
        ));
    }

    let (params, variadic) = parse_parameters(parser, true)?;

    let results = if parser.check(&Token::LeftParen) {
        parse_parameters(parser, false)?.0
    } else if parser.current().starts_type() {
        vec![Param {
            name: None,
            ty: parse_type(parser)?,
        }]
    } else {
        Vec::new()
    };

    Ok(FuncType {
        params,
        results,
        variadic,
        span: parser.span_from(start),
    })
}

/// One raw entry of a parameter list before names are grouped.
enum Entry {
    /// A lone identifier: either a parameter name or a type name
    Bare(Ident),
    /// `name T` or `name ...T`
    Named(Ident, TypeExpr, bool),
    /// `T` or `...T`
    Type(TypeExpr, bool),
}

/// Parse a parenthesized parameter or result list.
///
/// Returns the parameters and whether the last one is variadic.
pub fn parse_parameters(
    parser: &mut Parser,
    allow_variadic: bool,
) -> Result<(Vec<Param>, bool), ParseError> {
    let list_start = parser.current_span();
    parser.expect(Token::LeftParen)?;

    let mut entries = Vec::new();
    let mut guard = LoopGuard::new("parameter_list");
    while !parser.check(&Token::RightParen) {
        guard.check()?;
        entries.push(parse_entry(parser)?);
        if !parser.check(&Token::RightParen) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightParen)?;
    let list_span = parser.span_from(list_start);

    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter().enumerate() {
        let (variadic, span) = match entry {
            Entry::Named(name, _, variadic) => (*variadic, name.span),
            Entry::Type(ty, variadic) => (*variadic, ty.span),
            Entry::Bare(_) => (false, list_span),
        };
        if variadic && (!allow_variadic || i != last) {
            return Err(ParseError::invalid_syntax(
                "can only use ... with final parameter in list",
                span,
            ));
        }
    }

    group_entries(entries, list_span)
}

fn parse_entry(parser: &mut Parser) -> Result<Entry, ParseError> {
    if parser.check(&Token::Ellipsis) {
        parser.advance();
        return Ok(Entry::Type(parse_type(parser)?, true));
    }

    if let Token::Identifier(_) = parser.current() {
        match parser.peek() {
            Some(Token::Comma) | Some(Token::RightParen) => {
                return Ok(Entry::Bare(parser.expect_ident()?));
            }
            Some(Token::Ellipsis) => {
                let name = parser.expect_ident()?;
                parser.advance();
                return Ok(Entry::Named(name, parse_type(parser)?, true));
            }
            Some(Token::Dot) => {}
            Some(Token::LeftBracket)
                if closes_before(parser, 1, |t| matches!(t, Token::Comma | Token::RightParen)) => {}
            Some(next) if next.starts_type() => {
                let name = parser.expect_ident()?;
                return Ok(Entry::Named(name, parse_type(parser)?, false));
            }
            _ => {}
        }
    }

    Ok(Entry::Type(parse_type(parser)?, false))
}

/// Resolve `a, b int` grouping and reject lists mixing named and unnamed
/// entries.
fn group_entries(entries: Vec<Entry>, list_span: Span) -> Result<(Vec<Param>, bool), ParseError> {
    let named = entries.iter().any(|e| matches!(e, Entry::Named(..)));

    if !named {
        let mut variadic = false;
        let params = entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Bare(ident) => {
                    let span = ident.span;
                    Param {
                        name: None,
                        ty: TypeExpr::new(
                            TypeExprKind::Name {
                                package: None,
                                name: ident,
                            },
                            span,
                        ),
                    }
                }
                Entry::Type(ty, is_variadic) => {
                    variadic |= is_variadic;
                    Param { name: None, ty }
                }
                Entry::Named(..) => unreachable!("checked above"),
            })
            .collect();
        return Ok((params, variadic));
    }

    let mut params = Vec::with_capacity(entries.len());
    let mut pending: Vec<Ident> = Vec::new();
    let mut variadic = false;
    for entry in entries {
        match entry {
            Entry::Bare(ident) => pending.push(ident),
            Entry::Named(name, ty, is_variadic) => {
                if is_variadic && !pending.is_empty() {
                    return Err(ParseError::invalid_syntax(
                        "can only use ... with final parameter in list",
                        name.span,
                    ));
                }
                for ident in pending.drain(..) {
                    params.push(Param {
                        name: Some(ident),
                        ty: ty.clone(),
                    });
                }
                params.push(Param { name: Some(name), ty });
                variadic = is_variadic;
            }
            Entry::Type(ty, _) => return Err(ParseError::mixed_parameters(ty.span)),
        }
    }

    if let Some(ident) = pending.first() {
        return Err(ParseError::mixed_parameters(ident.span.merge(&list_span)));
    }

    Ok((params, variadic))
}

/// Parse `struct { ... }`.
pub fn parse_struct_body(parser: &mut Parser) -> Result<Vec<FieldDecl>, ParseError> {
    parser.expect(Token::Struct)?;
    parser.expect(Token::LeftBrace)?;

    let mut fields = Vec::new();
    let mut guard = LoopGuard::new("struct_fields");
    while !parser.check(&Token::RightBrace) {
        guard.check()?;
        if parser.check(&Token::Semicolon) {
            parser.advance();
            continue;
        }
        fields.push(parse_field(parser)?);
        parser.expect_semicolon()?;
    }
    parser.expect(Token::RightBrace)?;

    Ok(fields)
}

fn parse_field(parser: &mut Parser) -> Result<FieldDecl, ParseError> {
    let start = parser.current_span();

    let embedded = match parser.current() {
        Token::Star => true,
        Token::Identifier(_) => match parser.peek() {
            Some(Token::Semicolon | Token::RightBrace | Token::StringLiteral(_) | Token::Dot) => {
                true
            }
            Some(Token::LeftBracket) => closes_before(parser, 1, |t| {
                matches!(
                    t,
                    Token::Semicolon | Token::RightBrace | Token::StringLiteral(_)
                )
            }),
            _ => false,
        },
        _ => false,
    };

    let (names, ty) = if embedded {
        (Vec::new(), parse_type(parser)?)
    } else {
        let mut names = vec![parser.expect_ident()?];
        let mut guard = LoopGuard::new("field_names");
        while parser.check(&Token::Comma) {
            guard.check()?;
            parser.advance();
            names.push(parser.expect_ident()?);
        }
        (names, parse_type(parser)?)
    };

    let tag = match parser.current() {
        Token::StringLiteral(tag) => {
            let tag = tag.clone();
            parser.advance();
            Some(tag)
        }
        _ => None,
    };

    Ok(FieldDecl {
        names,
        ty,
        embedded,
        tag,
        span: parser.span_from(start),
    })
}

/// Parse `interface { ... }`.
pub fn parse_interface_body(parser: &mut Parser) -> Result<Vec<InterfaceElem>, ParseError> {
    parser.expect(Token::Interface)?;
    parser.expect(Token::LeftBrace)?;

    let mut elems = Vec::new();
    let mut guard = LoopGuard::new("interface_elements");
    while !parser.check(&Token::RightBrace) {
        guard.check()?;
        if parser.check(&Token::Semicolon) {
            parser.advance();
            continue;
        }
        elems.push(parse_interface_elem(parser)?);
        parser.expect_semicolon()?;
    }
    parser.expect(Token::RightBrace)?;

    Ok(elems)
}

fn parse_interface_elem(parser: &mut Parser) -> Result<InterfaceElem, ParseError> {
    if let (Token::Identifier(_), Some(Token::LeftParen)) = (parser.current(), parser.peek()) {
        let name = parser.expect_ident()?;
        let signature = parse_signature(parser)?;
        return Ok(InterfaceElem::Method { name, signature });
    }

    if parser.check(&Token::Tilde) {
        return Ok(InterfaceElem::TypeSet(parse_union(parser)?));
    }

    let ty = parse_type(parser)?;
    if !parser.check(&Token::Pipe) {
        return Ok(InterfaceElem::Embed(ty));
    }
    parser.advance();
    let mut terms = vec![TypeTerm { tilde: false, ty }];
    terms.extend(parse_union(parser)?);
    Ok(InterfaceElem::TypeSet(terms))
}
