//! Conflict guard
//!
//! Generation never merges with existing code: the new type name must be
//! free in the destination package, and the destination must be the
//! interface's own package.

use crate::error::ConcreteError;
use crate::resolver::InterfaceDescriptor;
use concrete_checker::{CompilationUnit, SymbolKind};

/// Run every check for generating `name` into `destination`. The package
/// check comes first, so a cross-package request fails the same way
/// whatever else is wrong with it.
pub fn guard(
    iface: &InterfaceDescriptor,
    requested: Option<&str>,
    destination: &CompilationUnit,
    name: &str,
) -> Result<(), ConcreteError> {
    check_package(iface, requested)?;
    check_destination(iface, destination)?;
    check_free(destination, name)
}

/// Reject a requested destination package other than the interface's.
pub fn check_package(
    iface: &InterfaceDescriptor,
    requested: Option<&str>,
) -> Result<(), ConcreteError> {
    match requested {
        Some(requested) if requested != iface.package.name => {
            Err(ConcreteError::UnsupportedCrossPackage {
                requested: requested.to_string(),
                package: iface.package.name.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Reject a separately loaded destination unit declaring another package.
pub fn check_destination(
    iface: &InterfaceDescriptor,
    destination: &CompilationUnit,
) -> Result<(), ConcreteError> {
    let package = &destination.package().name;
    if *package != iface.package.name {
        return Err(ConcreteError::UnsupportedCrossPackage {
            requested: package.clone(),
            package: iface.package.name.clone(),
        });
    }
    Ok(())
}

/// Fail if `name` is declared at package scope of `unit`, whatever it is.
pub fn check_free(unit: &CompilationUnit, name: &str) -> Result<(), ConcreteError> {
    let Some(existing) = unit.lookup(name) else {
        return Ok(());
    };
    let kind = match (existing.kind, existing.ty) {
        (SymbolKind::Type, Some(ty)) if unit.ctx().is_interface(ty) => "interface",
        (kind, _) => kind.describe(),
    };
    Err(ConcreteError::AlreadyExists {
        name: name.to_string(),
        kind: kind.to_string(),
    })
}
