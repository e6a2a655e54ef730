//! Declaration nodes

use super::{ExprText, FuncType, Ident, TypeExpr, TypeParam};
use crate::token::Span;

/// How an import binds its package in the file scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// `import "fmt"`: bound under the package's declared name
    Default,
    /// `import . "fmt"`: exported names merged into the file scope
    Dot,
    /// `import f "fmt"` or `import _ "fmt"`
    Named(Ident),
}

/// A single import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: ImportName,
    pub path: String,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// `const ( ... )`
    Const(Vec<ValueSpec>),
    /// `var ( ... )`
    Var(Vec<ValueSpec>),
    /// `type ( ... )`
    Type(Vec<TypeSpec>),
    /// Function or method declaration
    Func(FuncDecl),
}

/// One line of a const or var declaration: `a, b int = 1, 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<ExprText>,
    pub span: Span,
}

/// `type Name T` or `type Name = T`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    /// Empty unless the type is generic: `type List[T any] ...`
    pub type_params: Vec<TypeParam>,
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

impl TypeSpec {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// The receiver of a method declaration: `(t *T)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: Option<Ident>,
    pub pointer: bool,
    pub base: Ident,
    /// Type parameter names of a generic base: `(l *List[T])`
    pub type_args: Vec<Ident>,
    pub span: Span,
}

/// `func (recv) Name(params) results { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub receiver: Option<Receiver>,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub signature: FuncType,
    /// False for declarations without a body (assembly-backed functions)
    pub has_body: bool,
    pub span: Span,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// True for generic functions and methods of generic types.
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
            || self
                .receiver
                .as_ref()
                .is_some_and(|receiver| !receiver.type_args.is_empty())
    }
}
