//! Core type definitions for the Go type model

use std::fmt;

/// Unique identifier for a type in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Get the raw value of this TypeId
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Identifier of a declared (named) type. Every `type T ...` declaration
/// gets its own `NamedId`, so two declarations are never identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedId(pub(crate) u32);

/// The package a named type is declared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    /// Declared package name, used to qualify type strings
    pub name: String,
    /// Import path (or directory) identifying the package
    pub path: String,
}

impl PackageRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Predeclared basic types.
///
/// `byte` and `rune` are kept apart from `uint8` and `int32` so they print
/// the way they were written; identity treats them as the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Byte,
    Rune,
}

impl BasicKind {
    pub const ALL: [BasicKind; 19] = [
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::String,
        BasicKind::Byte,
        BasicKind::Rune,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
        }
    }

    /// The kind identity is decided on: `byte` is `uint8`, `rune` is `int32`.
    pub fn canonical(&self) -> BasicKind {
        match self {
            BasicKind::Byte => BasicKind::Uint8,
            BasicKind::Rune => BasicKind::Int32,
            other => *other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, BasicKind::Bool | BasicKind::String)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Length of an array type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayLen {
    /// A constant the checker could evaluate
    Known(u64),
    /// Constant expression kept as written
    Expr(String),
}

impl fmt::Display for ArrayLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLen::Known(n) => write!(f, "{}", n),
            ArrayLen::Expr(text) => f.write_str(text),
        }
    }
}

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A parameter or result of a signature. Names do not take part in identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: Option<String>,
    pub ty: TypeId,
}

impl Var {
    pub fn new(name: Option<String>, ty: TypeId) -> Self {
        Self { name, ty }
    }

    pub fn unnamed(ty: TypeId) -> Self {
        Self { name: None, ty }
    }
}

/// Function signature. When `variadic` is set the last parameter's type is
/// the slice `[]T` of a `...T` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
    pub embedded: bool,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    pub fields: Vec<Field>,
}

/// An explicitly declared interface method. `signature` refers to a
/// `Type::Signature`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    pub name: String,
    pub signature: TypeId,
}

/// An interface as written: own methods plus embedded types. The complete
/// method set is computed by `TypeContext::method_set`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
    pub embeddeds: Vec<TypeId>,
    /// Has type-set elements, so it may only constrain type parameters.
    /// Embedded non-interface types are type-set terms.
    pub constraint: bool,
}

/// A Go type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Basic(BasicKind),
    Named(NamedId),
    Pointer(TypeId),
    Slice(TypeId),
    Array { len: ArrayLen, elem: TypeId },
    Map { key: TypeId, value: TypeId },
    Chan { dir: ChanDir, elem: TypeId },
    Signature(Signature),
    Struct(StructType),
    Interface(InterfaceType),
    /// A type parameter, by name, inside a generic declaration
    Param(String),
    /// A generic named type with type arguments: `List[int]`
    Instance { base: TypeId, args: Vec<TypeId> },
}

impl Type {
    /// Short description of the type's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Basic(_) => "basic type",
            Type::Named(_) => "named type",
            Type::Pointer(_) => "pointer",
            Type::Slice(_) => "slice",
            Type::Array { .. } => "array",
            Type::Map { .. } => "map",
            Type::Chan { .. } => "channel",
            Type::Signature(_) => "function",
            Type::Struct(_) => "struct",
            Type::Interface(_) => "interface",
            Type::Param(_) => "type parameter",
            Type::Instance { .. } => "instantiated type",
        }
    }
}

/// A declared type: `type Name Underlying`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    /// `None` for predeclared types such as `error`
    pub package: Option<PackageRef>,
    /// Bound once the declaration has been resolved
    pub underlying: Option<TypeId>,
    /// Type parameter names of a generic declaration
    pub type_params: Vec<String>,
    /// Declared in a package whose source is not available; the
    /// underlying type is never known
    pub opaque: bool,
}

impl NamedType {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_and_rune_canonical_kinds() {
        assert_eq!(BasicKind::Byte.canonical(), BasicKind::Uint8);
        assert_eq!(BasicKind::Rune.canonical(), BasicKind::Int32);
        assert_eq!(BasicKind::Float64.canonical(), BasicKind::Float64);
    }

    #[test]
    fn test_numeric_kinds() {
        assert!(BasicKind::Complex128.is_numeric());
        assert!(BasicKind::Byte.is_numeric());
        assert!(!BasicKind::String.is_numeric());
        assert!(!BasicKind::Bool.is_numeric());
    }

    #[test]
    fn test_array_len_display() {
        assert_eq!(ArrayLen::Known(16).to_string(), "16");
        assert_eq!(ArrayLen::Expr("Size * 2".to_string()).to_string(), "Size * 2");
    }
}
