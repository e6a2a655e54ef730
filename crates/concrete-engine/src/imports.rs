//! Import paths needed by generated stubs

use crate::flatten::MethodSignature;
use concrete_checker::CompilationUnit;
use concrete_types::{PackageRef, Type, TypeContext, TypeId};
use rustc_hash::FxHashSet;

/// Import paths of every package named by a parameter or result type of
/// `methods`, other than the package at `local`. Sorted and de-duplicated.
pub fn required_imports(
    unit: &CompilationUnit,
    methods: &[MethodSignature],
    local: &str,
) -> Vec<String> {
    let mut walker = PackageWalker {
        ctx: unit.ctx(),
        local,
        visited: FxHashSet::default(),
        packages: Vec::new(),
    };
    for typing in methods.iter().filter_map(|m| m.typing.as_ref()) {
        for param in &typing.params {
            walker.visit(param.ty);
        }
        for &result in &typing.results {
            walker.visit(result);
        }
    }

    let mut paths: Vec<String> = walker
        .packages
        .iter()
        .map(|package| unit.import_path_for(package))
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

struct PackageWalker<'a> {
    ctx: &'a TypeContext,
    local: &'a str,
    visited: FxHashSet<TypeId>,
    packages: Vec<PackageRef>,
}

impl PackageWalker<'_> {
    /// Record the packages of the named types written out in `ty`. The
    /// underlying types of named types are not written, so they are not
    /// followed.
    fn visit(&mut self, ty: TypeId) {
        if !self.visited.insert(ty) {
            return;
        }
        let ctx = self.ctx;
        match ctx.get(ty) {
            Type::Basic(_) | Type::Param(_) => {}
            Type::Named(id) => {
                if let Some(package) = &ctx.named(*id).package {
                    if package.path != self.local && !self.packages.contains(package) {
                        self.packages.push(package.clone());
                    }
                }
            }
            Type::Pointer(elem) | Type::Slice(elem) => self.visit(*elem),
            Type::Array { elem, .. } | Type::Chan { elem, .. } => self.visit(*elem),
            Type::Map { key, value } => {
                self.visit(*key);
                self.visit(*value);
            }
            Type::Signature(sig) => {
                for var in sig.params.iter().chain(&sig.results) {
                    self.visit(var.ty);
                }
            }
            Type::Struct(st) => {
                for field in &st.fields {
                    self.visit(field.ty);
                }
            }
            Type::Interface(iface) => {
                for method in &iface.methods {
                    self.visit(method.signature);
                }
                for &embedded in &iface.embeddeds {
                    self.visit(embedded);
                }
            }
            Type::Instance { base, args } => {
                self.visit(*base);
                for &arg in args {
                    self.visit(arg);
                }
            }
        }
    }
}
