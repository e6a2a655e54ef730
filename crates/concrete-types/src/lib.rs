//! Go type model.
//!
//! Provides the interned [`TypeContext`], type identity, complete interface
//! method sets, and rendering of types as Go source text.

pub mod context;
pub mod display;
pub mod error;
pub mod identical;
pub mod method_set;
pub mod ty;

pub use context::TypeContext;
pub use display::TypeWriter;
pub use error::TypeError;
pub use method_set::MethodEntry;
pub use ty::{
    ArrayLen, BasicKind, ChanDir, Field, InterfaceType, Method, NamedId, NamedType, PackageRef,
    Signature, StructType, Type, TypeId, Var,
};
