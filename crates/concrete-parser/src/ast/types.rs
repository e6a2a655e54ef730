//! Type expression nodes
//!
//! A `TypeExpr` is the syntactic form of a type as written in source. The
//! checker resolves it into a type of the type context.

use super::{ExprText, Ident};
use crate::token::Span;

/// A type expression with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `T` or `pkg.T`
    Name {
        package: Option<Ident>,
        name: Ident,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`, length kept as source text
    Array {
        len: ExprText,
        elem: Box<TypeExpr>,
    },
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    /// `func(params) results`
    Func(FuncType),
    /// `struct { ... }`
    Struct(Vec<FieldDecl>),
    /// `interface { ... }`
    Interface(Vec<InterfaceElem>),
    /// `(T)`
    Paren(Box<TypeExpr>),
    /// `List[int]` or `pkg.Pair[K, V]`; `base` is a `Name`
    Instance {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// A type-set union in a constraint: `~int | ~string`
    Union(Vec<TypeTerm>),
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Strip any number of surrounding parentheses.
    pub fn unparen(&self) -> &TypeExpr {
        let mut ty = self;
        while let TypeExprKind::Paren(inner) = &ty.kind {
            ty = inner;
        }
        ty
    }
}

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A function signature.
///
/// When `variadic` is set, the final parameter was written `...T` and its
/// `ty` holds the element type `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub variadic: bool,
    pub span: Span,
}

/// A single parameter or result. Grouped names (`a, b int`) are expanded
/// into one `Param` each.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
}

/// A struct field line: `a, b int "tag"` or an embedded `*pkg.T`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub embedded: bool,
    pub tag: Option<String>,
    pub span: Span,
}

/// One term of a type-set union.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTerm {
    /// Written `~T`: every type whose underlying type is `T`
    pub tilde: bool,
    pub ty: TypeExpr,
}

/// A group of type parameters sharing one constraint: `K, V comparable`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub names: Vec<Ident>,
    pub constraint: TypeExpr,
}

/// An element of an interface body.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    /// `Name(params) results`
    Method { name: Ident, signature: FuncType },
    /// An embedded interface: `io.Reader`
    Embed(TypeExpr),
    /// A type-set element of a constraint: `~int | ~int64`
    TypeSet(Vec<TypeTerm>),
}
