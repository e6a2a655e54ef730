//! Method-set flattening
//!
//! Turns the complete method set of an interface into the signatures the
//! renderer writes stubs for. Embedding is expanded by
//! `TypeContext::method_set`, the same algorithm the checker validates
//! interfaces with.

use crate::error::ConcreteError;
use crate::resolver::InterfaceDescriptor;
use concrete_types::{Type, TypeContext, TypeError, TypeId};
use rustc_hash::FxHashSet;

/// Placeholder name of an unnamed parameter.
pub const BLANK: &str = "_";

/// A parameter of a flattened method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared name, or `_`
    pub name: String,
    /// For the variadic parameter this is the slice type `[]T`
    pub ty: TypeId,
}

/// Parameter and result types of a flattened method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typing {
    pub params: Vec<Param>,
    pub results: Vec<TypeId>,
    /// The last parameter is `...T`
    pub variadic: bool,
}

/// One method of a flattened method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    /// `None` when the method's type is not a function signature
    pub typing: Option<Typing>,
}

impl MethodSignature {
    /// True when the method has exactly one result.
    pub fn has_single_result(&self) -> bool {
        self.typing
            .as_ref()
            .is_some_and(|typing| typing.results.len() == 1)
    }

    /// Number of parameters and results.
    pub fn arity(&self) -> (usize, usize) {
        self.typing
            .as_ref()
            .map_or((0, 0), |typing| (typing.params.len(), typing.results.len()))
    }
}

/// Flatten the method set of an interface: embedded interfaces first, in
/// embedding order, then the interface's own methods in declaration order.
pub fn flatten(
    ctx: &TypeContext,
    iface: &InterfaceDescriptor,
) -> Result<Vec<MethodSignature>, ConcreteError> {
    let entries = ctx.method_set(iface.ty).map_err(|err| match err {
        TypeError::DuplicateMethod { method, .. } => ConcreteError::DuplicateMethod {
            interface: iface.name.clone(),
            method,
        },
        TypeError::Generic { name } => ConcreteError::GenericInterface {
            name: iface.name.clone(),
            type_name: name,
        },
        source => ConcreteError::InvalidInterface {
            name: iface.name.clone(),
            source,
        },
    })?;

    let mut seen = FxHashSet::default();
    let mut methods = Vec::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.name.clone()) {
            return Err(ConcreteError::DuplicateMethod {
                interface: iface.name.clone(),
                method: entry.name,
            });
        }
        methods.push(MethodSignature {
            typing: typing(ctx, entry.signature),
            name: entry.name,
        });
    }
    Ok(methods)
}

fn typing(ctx: &TypeContext, signature: TypeId) -> Option<Typing> {
    let Type::Signature(sig) = ctx.get(signature) else {
        return None;
    };
    let params = sig
        .params
        .iter()
        .map(|var| Param {
            name: match var.name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => BLANK.to_string(),
            },
            ty: var.ty,
        })
        .collect();
    Some(Typing {
        params,
        results: sig.results.iter().map(|var| var.ty).collect(),
        variadic: sig.variadic,
    })
}
