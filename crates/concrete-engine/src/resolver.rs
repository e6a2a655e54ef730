//! Symbol resolution
//!
//! Finds the interface a request names in the package scope of a
//! compilation unit, and enumerates the interfaces a package declares.

use crate::error::ConcreteError;
use concrete_checker::{CompilationUnit, Symbol, SymbolKind};
use concrete_types::{PackageRef, Type, TypeContext, TypeId, TypeWriter};

/// A resolved interface declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub name: String,
    /// Package declaring the interface
    pub package: PackageRef,
    /// The interface type; its underlying type is a `Type::Interface`
    pub ty: TypeId,
}

/// Look up `name` in the package scope and check that it is an interface
/// a type can implement: not generic and not a type constraint.
pub fn resolve(unit: &CompilationUnit, name: &str) -> Result<InterfaceDescriptor, ConcreteError> {
    let symbol = unit.lookup(name).ok_or_else(|| ConcreteError::NotFound {
        name: name.to_string(),
        package: unit.package().name.clone(),
    })?;

    let ctx = unit.ctx();
    if let Some(ty) = symbol.ty.filter(|_| symbol.kind.is_type()) {
        if ctx.is_constraint(ty) {
            return Err(ConcreteError::NotAnInterface {
                name: symbol.name.clone(),
                kind: "type constraint".to_string(),
            });
        }
        if ctx.is_interface(ty) && ctx.needs_instantiation(ty) {
            return Err(ConcreteError::GenericInterface {
                name: symbol.name.clone(),
                type_name: TypeWriter::relative_to(ctx, &unit.package().path).type_string(ty),
            });
        }
    }

    match interface_type(unit.ctx(), symbol) {
        Some(ty) => Ok(InterfaceDescriptor {
            name: symbol.name.clone(),
            package: unit.package().clone(),
            ty,
        }),
        None => Err(ConcreteError::NotAnInterface {
            name: symbol.name.clone(),
            kind: describe(unit.ctx(), symbol),
        }),
    }
}

/// Names of every package-scope interface a type can implement, sorted.
pub fn list_interfaces(unit: &CompilationUnit) -> Vec<String> {
    let ctx = unit.ctx();
    unit.package_symbols()
        .into_iter()
        .filter(|symbol| {
            interface_type(ctx, symbol)
                .is_some_and(|ty| !ctx.is_constraint(ty) && !ctx.needs_instantiation(ty))
        })
        .map(|symbol| symbol.name.clone())
        .collect()
}

/// The type of a type or alias symbol whose underlying type is an interface.
fn interface_type(ctx: &TypeContext, symbol: &Symbol) -> Option<TypeId> {
    if !symbol.kind.is_type() {
        return None;
    }
    symbol.ty.filter(|&ty| ctx.is_interface(ty))
}

/// What a non-interface symbol is, for error messages: the kind of the
/// underlying type for types, the declaration kind otherwise.
fn describe(ctx: &TypeContext, symbol: &Symbol) -> String {
    let ty = match (symbol.kind, symbol.ty) {
        (SymbolKind::Type | SymbolKind::Alias, Some(ty)) => ty,
        (kind, _) => return kind.describe().to_string(),
    };
    match ctx.underlying(ty).map(|underlying| ctx.get(underlying)) {
        Ok(Type::Basic(kind)) => kind.name().to_string(),
        Ok(other) => other.kind_name().to_string(),
        Err(_) => symbol.kind.describe().to_string(),
    }
}
