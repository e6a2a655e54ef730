//! Name binding - builds the package scope from parsed files
//!
//! The binder declares every top-level name of a package, binds each
//! file's imports, resolves type expressions to `TypeId` values and
//! validates what a declaration-level checker can see: recursive types,
//! interface method sets, method receivers and duplicate declarations.
//! Errors are collected; a package with any error is rejected as a whole.

use crate::consts::{ConstDecl, ConstEvaluator};
use crate::error::{CheckError, Location};
use crate::importer::{Importer, PackageInfo};
use crate::source::FileId;
use crate::symbols::{ScopeId, ScopeKind, Symbol, SymbolKind, SymbolTable};
use concrete_parser::ast::{
    self, Decl, FieldDecl, FuncDecl, FuncType, Ident, ImportName, InterfaceElem, Receiver,
    SourceFile, TypeExpr, TypeExprKind, TypeParam, TypeSpec, TypeTerm, ValueSpec,
};
use concrete_types::{
    ArrayLen, ChanDir, Field, Method, PackageRef, Type, TypeContext, TypeError, TypeId, Var,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, trace};

/// Predeclared functions of the universe scope
const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// Predeclared constants of the universe scope
const BUILTIN_CONSTS: &[&str] = &["true", "false", "iota"];

/// Result of binding a package.
#[derive(Debug, Clone)]
pub struct BoundPackage {
    pub symbols: SymbolTable,
    /// File scope of each file, indexed by `FileId`
    pub file_scopes: Vec<ScopeId>,
    /// Identity path of each imported package to the path as written
    pub import_paths: FxHashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    InProgress,
    Done,
}

#[derive(Clone, Copy)]
struct TypeDecl<'a> {
    file: FileId,
    spec: &'a TypeSpec,
}

/// An interface type to validate once every declaration is resolved.
struct InterfaceSite {
    name: String,
    ty: TypeId,
    location: Location,
}

/// Binder - builds the symbol table of one package
pub struct Binder<'a> {
    ctx: &'a mut TypeContext,
    importer: &'a mut dyn Importer,
    package: PackageRef,
    dir: Option<&'a Path>,
    symbols: SymbolTable,
    file_scopes: Vec<ScopeId>,
    packages: FxHashMap<String, Rc<PackageInfo>>,
    import_paths: FxHashMap<String, String>,
    type_decls: FxHashMap<String, TypeDecl<'a>>,
    states: FxHashMap<String, ResolveState>,
    /// Type declarations being resolved, outermost first
    resolving: Vec<String>,
    consts: FxHashMap<String, ConstDecl>,
    interfaces: Vec<InterfaceSite>,
    /// Member sets of cycles already reported
    reported_cycles: FxHashSet<Vec<String>>,
    errors: Vec<CheckError>,
}

impl<'a> Binder<'a> {
    /// Create a binder for `package`. `dir` is the package directory that
    /// relative imports are resolved against.
    pub fn new(
        ctx: &'a mut TypeContext,
        importer: &'a mut dyn Importer,
        package: PackageRef,
        dir: Option<&'a Path>,
    ) -> Self {
        let mut symbols = SymbolTable::new();
        for (name, ty) in ctx.universe() {
            let kind = if name == "any" {
                SymbolKind::Alias
            } else {
                SymbolKind::Type
            };
            // Names of the universe are distinct, definition cannot fail
            let _ = symbols.define_in_scope(
                SymbolTable::UNIVERSE,
                Symbol::new(name, kind, None).with_type(ty),
            );
        }
        for name in BUILTIN_FUNCS {
            let _ = symbols.define_in_scope(
                SymbolTable::UNIVERSE,
                Symbol::new(*name, SymbolKind::Func, None),
            );
        }
        for name in BUILTIN_CONSTS {
            let _ = symbols.define_in_scope(
                SymbolTable::UNIVERSE,
                Symbol::new(*name, SymbolKind::Const, None),
            );
        }
        let _ = symbols.define_in_scope(
            SymbolTable::UNIVERSE,
            Symbol::new("nil", SymbolKind::Var, None),
        );

        Binder {
            ctx,
            importer,
            package,
            dir,
            symbols,
            file_scopes: Vec::new(),
            packages: FxHashMap::default(),
            import_paths: FxHashMap::default(),
            type_decls: FxHashMap::default(),
            states: FxHashMap::default(),
            resolving: Vec::new(),
            consts: FxHashMap::default(),
            interfaces: Vec::new(),
            reported_cycles: FxHashSet::default(),
            errors: Vec::new(),
        }
    }

    /// Bind the files of a package (entry point)
    ///
    /// File ids used in error locations are indexes into `files`.
    #[tracing::instrument(skip_all, fields(package = %self.package.path, files = files.len()))]
    pub fn bind(mut self, files: &'a [SourceFile]) -> Result<BoundPackage, Vec<CheckError>> {
        self.check_package_names(files);
        self.collect_declarations(files);
        self.bind_imports(files);

        for (file, source) in files.iter().enumerate() {
            for spec in source.type_specs() {
                let owns_decl = self
                    .type_decls
                    .get(&spec.name.name)
                    .is_some_and(|decl| decl.file == file && std::ptr::eq(decl.spec, spec));
                if owns_decl {
                    self.resolve_type_decl(&spec.name.name);
                }
            }
        }

        self.bind_signatures_and_values(files);
        self.check_interfaces();
        self.check_value_cycles(files);

        debug!(
            symbols = self.symbols.package_symbols().len(),
            errors = self.errors.len(),
            "bound package"
        );

        if self.errors.is_empty() {
            Ok(BoundPackage {
                symbols: self.symbols,
                file_scopes: self.file_scopes,
                import_paths: self.import_paths,
            })
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn check_package_names(&mut self, files: &[SourceFile]) {
        let Some(first) = files.first() else {
            return;
        };
        for (file, source) in files.iter().enumerate().skip(1) {
            if source.package.name != first.package.name {
                self.errors.push(CheckError::PackageMismatch {
                    expected: first.package.name.clone(),
                    found: source.package.name.clone(),
                    location: Location::new(file, source.package.span),
                });
            }
        }
    }

    fn collect_declarations(&mut self, files: &'a [SourceFile]) {
        for (file, source) in files.iter().enumerate() {
            for decl in &source.decls {
                match decl {
                    Decl::Type(specs) => {
                        for spec in specs {
                            self.declare_type(file, spec);
                        }
                    }
                    Decl::Func(func) if func.receiver.is_none() => {
                        // init may be declared any number of times
                        if func.name.name != "init" {
                            self.declare(file, &func.name, SymbolKind::Func);
                        }
                    }
                    Decl::Func(_) => {}
                    Decl::Var(specs) => {
                        for spec in specs {
                            for name in &spec.names {
                                self.declare(file, name, SymbolKind::Var);
                            }
                        }
                    }
                    Decl::Const(specs) => self.declare_consts(file, specs),
                }
            }
        }
    }

    /// Define a package-level name. Returns false for `_` and duplicates.
    fn declare(&mut self, file: FileId, name: &Ident, kind: SymbolKind) -> bool {
        self.declare_symbol(Symbol::new(
            name.name.clone(),
            kind,
            Some(Location::new(file, name.span)),
        ))
    }

    fn declare_symbol(&mut self, symbol: Symbol) -> bool {
        if symbol.name == "_" {
            return false;
        }
        let scope = self.symbols.package_scope_id();
        match self.symbols.define_in_scope(scope, symbol) {
            Ok(()) => true,
            Err(err) => {
                if let Some(duplicate) = err.duplicate {
                    self.errors.push(CheckError::Duplicate {
                        name: err.name,
                        original: err.original,
                        duplicate,
                    });
                }
                false
            }
        }
    }

    fn declare_type(&mut self, file: FileId, spec: &'a TypeSpec) {
        let location = Some(Location::new(file, spec.name.span));
        let symbol = if spec.alias {
            Symbol::new(spec.name.name.clone(), SymbolKind::Alias, location)
        } else {
            let (named_id, ty) = self
                .ctx
                .declare_named(spec.name.name.clone(), Some(self.package.clone()));
            if spec.is_generic() {
                let names = spec
                    .type_params
                    .iter()
                    .flat_map(|param| param.names.iter().map(|n| n.name.clone()))
                    .collect();
                self.ctx.set_type_params(named_id, names);
            }
            Symbol::new(spec.name.name.clone(), SymbolKind::Type, location).with_type(ty)
        };

        if self.declare_symbol(symbol) {
            self.type_decls
                .insert(spec.name.name.clone(), TypeDecl { file, spec });
        }
    }

    /// Declare the constants of one group. A spec without values repeats
    /// the expressions of the last spec that had them, with its own iota.
    fn declare_consts(&mut self, file: FileId, specs: &[ValueSpec]) {
        let mut last_values: &[ast::ExprText] = &[];
        for (iota, spec) in specs.iter().enumerate() {
            if !spec.values.is_empty() {
                last_values = &spec.values;
            }
            for (i, name) in spec.names.iter().enumerate() {
                if self.declare(file, name, SymbolKind::Const) {
                    self.consts.insert(
                        name.name.clone(),
                        ConstDecl {
                            expr: last_values.get(i).map(|value| value.text.clone()),
                            iota: iota as i64,
                        },
                    );
                }
            }
        }
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn bind_imports(&mut self, files: &[SourceFile]) {
        let package_scope = self.symbols.package_scope_id();
        for (file, source) in files.iter().enumerate() {
            let scope = self.symbols.push_scope(ScopeKind::File, package_scope);
            self.file_scopes.push(scope);

            for spec in &source.imports {
                let location = Location::new(file, spec.span);
                let info = match self.importer.import(&spec.path, self.dir, &mut *self.ctx) {
                    Ok(info) => info,
                    Err(err) => {
                        self.errors.push(CheckError::UnresolvedImport {
                            path: spec.path.clone(),
                            reason: err.to_string(),
                            location,
                        });
                        continue;
                    }
                };
                trace!(path = %spec.path, package = %info.package.name, "imported");

                self.import_paths
                    .entry(info.package.path.clone())
                    .or_insert_with(|| spec.path.clone());
                self.packages
                    .insert(info.package.path.clone(), Rc::clone(&info));

                let name = match &spec.name {
                    ImportName::Default => info.package.name.clone(),
                    ImportName::Named(ident) if ident.is_blank() => continue,
                    ImportName::Named(ident) => ident.name.clone(),
                    ImportName::Dot => {
                        for member in info.exported_members() {
                            self.bind_file_symbol(scope, member.clone(), location);
                        }
                        continue;
                    }
                };

                let mut symbol = Symbol::new(name, SymbolKind::Package, Some(location));
                symbol.package = Some(info.package.path.clone());
                self.bind_file_symbol(scope, symbol, location);
            }
        }
    }

    /// Define an imported name in a file scope. It may not collide with a
    /// package-level declaration or another import of the file.
    fn bind_file_symbol(&mut self, scope: ScopeId, mut symbol: Symbol, location: Location) {
        if let Some(existing) = self.symbols.lookup_package(&symbol.name) {
            self.errors.push(CheckError::Duplicate {
                name: symbol.name.clone(),
                original: existing.location,
                duplicate: location,
            });
            return;
        }
        symbol.location = Some(location);
        if let Err(err) = self.symbols.define_in_scope(scope, symbol) {
            self.errors.push(CheckError::Duplicate {
                name: err.name,
                original: err.original,
                duplicate: location,
            });
        }
    }

    // ========================================================================
    // Type declarations
    // ========================================================================

    /// Resolve a local type declaration, returning the type it denotes.
    ///
    /// Returns `None` for names that are not local type declarations and
    /// for declarations found to be part of a cycle.
    fn resolve_type_decl(&mut self, name: &str) -> Option<TypeId> {
        let decl = *self.type_decls.get(name)?;
        let location = Location::new(decl.file, decl.spec.name.span);

        match self.states.get(name) {
            Some(ResolveState::Done) => return self.symbols.lookup_package(name)?.ty,
            Some(ResolveState::InProgress) => {
                let start = self
                    .resolving
                    .iter()
                    .position(|n| n == name)
                    .unwrap_or(0);
                let mut cycle = self.resolving[start..].to_vec();
                cycle.push(name.to_string());
                self.report_cycle(cycle, location);
                return None;
            }
            None => {}
        }

        trace!(name, "resolving type declaration");
        self.states.insert(name.to_string(), ResolveState::InProgress);
        self.resolving.push(name.to_string());

        let mut scope = self.file_scopes[decl.file];
        if decl.spec.is_generic() {
            scope = self.bind_type_params(&decl.spec.type_params, decl.file, scope, name);
        }
        let resolved = match self.resolve_type(&decl.spec.ty, decl.file, scope, name) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.errors.push(err);
                None
            }
        };

        // `type A B` needs B's underlying type, so B is resolved while A
        // is still in progress. The same holds for `type A B[int]`.
        if let (false, Some(target)) = (decl.spec.alias, resolved) {
            let target = match self.ctx.get(target) {
                Type::Instance { base, .. } => *base,
                _ => target,
            };
            if let Some(target) = self.ctx.as_named(target) {
                let local = target.package.as_ref() == Some(&self.package);
                if local && target.underlying.is_none() {
                    let target_name = target.name.clone();
                    self.resolve_type_decl(&target_name);
                }
            }
        }

        self.resolving.pop();
        self.states.insert(name.to_string(), ResolveState::Done);

        let package_scope = self.symbols.package_scope_id();
        if decl.spec.alias {
            let ty = resolved.unwrap_or_else(|| self.ctx.empty_interface());
            self.symbols.update_type(package_scope, name, ty);
            return Some(ty);
        }

        let named = self.symbols.lookup_package(name)?.ty?;
        if let Type::Named(named_id) = *self.ctx.get(named) {
            let underlying = resolved.unwrap_or_else(|| self.ctx.empty_interface());
            self.ctx.set_underlying(named_id, underlying);
            let broken = match self.ctx.underlying(named) {
                Ok(_) | Err(TypeError::Opaque { .. }) => false,
                Err(_) => true,
            };
            if broken {
                // The target was part of a cycle
                let placeholder = self.ctx.empty_interface();
                self.ctx.set_underlying(named_id, placeholder);
            }
        }
        Some(named)
    }

    fn report_cycle(&mut self, cycle: Vec<String>, location: Location) {
        let mut members = cycle.clone();
        members.sort();
        members.dedup();
        if self.reported_cycles.insert(members) {
            self.errors.push(CheckError::InvalidRecursiveType {
                cycle: cycle.join(" -> "),
                location,
            });
        }
    }

    /// Open a scope binding the type parameters of a generic declaration,
    /// then resolve their constraints in it.
    fn bind_type_params(
        &mut self,
        params: &[TypeParam],
        file: FileId,
        parent: ScopeId,
        owner: &str,
    ) -> ScopeId {
        let scope = self.symbols.push_scope(ScopeKind::TypeParams, parent);
        for name in params.iter().flat_map(|param| &param.names) {
            self.bind_type_param(scope, name, file);
        }
        for param in params {
            if let Err(err) = self.resolve_type(&param.constraint, file, scope, owner) {
                self.errors.push(err);
            }
        }
        scope
    }

    fn bind_type_param(&mut self, scope: ScopeId, name: &Ident, file: FileId) {
        if name.is_blank() {
            return;
        }
        let location = Location::new(file, name.span);
        let ty = self.ctx.type_param(name.name.clone());
        let symbol = Symbol::new(name.name.clone(), SymbolKind::Type, Some(location)).with_type(ty);
        if let Err(err) = self.symbols.define_in_scope(scope, symbol) {
            self.errors.push(CheckError::Duplicate {
                name: err.name,
                original: err.original,
                duplicate: location,
            });
        }
    }

    // ========================================================================
    // Type expressions
    // ========================================================================

    /// Resolve a type expression in the scope of one file. `owner` names
    /// the declaration the expression belongs to, for error messages.
    fn resolve_type(
        &mut self,
        expr: &TypeExpr,
        file: FileId,
        scope: ScopeId,
        owner: &str,
    ) -> Result<TypeId, CheckError> {
        match &expr.kind {
            TypeExprKind::Name { package, name } => {
                self.resolve_type_name(package.as_ref(), name, file, scope)
            }
            TypeExprKind::Pointer(elem) => {
                let elem = self.resolve_type(elem, file, scope, owner)?;
                Ok(self.ctx.pointer(elem))
            }
            TypeExprKind::Slice(elem) => {
                let elem = self.resolve_type(elem, file, scope, owner)?;
                Ok(self.ctx.slice(elem))
            }
            TypeExprKind::Array { len, elem } => {
                let elem = self.resolve_type(elem, file, scope, owner)?;
                let len = match ConstEvaluator::new(&self.consts).eval_len(&len.text) {
                    Some(n) => ArrayLen::Known(n),
                    None => ArrayLen::Expr(len.text.trim().to_string()),
                };
                Ok(self.ctx.array(len, elem))
            }
            TypeExprKind::Map { key, value } => {
                let key = self.resolve_type(key, file, scope, owner)?;
                let value = self.resolve_type(value, file, scope, owner)?;
                Ok(self.ctx.map(key, value))
            }
            TypeExprKind::Chan { dir, elem } => {
                let elem = self.resolve_type(elem, file, scope, owner)?;
                let dir = match dir {
                    ast::ChanDir::Both => ChanDir::Both,
                    ast::ChanDir::Send => ChanDir::Send,
                    ast::ChanDir::Recv => ChanDir::Recv,
                };
                Ok(self.ctx.chan(dir, elem))
            }
            TypeExprKind::Func(func) => self.resolve_signature(func, file, scope, owner),
            TypeExprKind::Struct(fields) => self.resolve_struct(fields, file, scope, owner),
            TypeExprKind::Interface(elems) => {
                self.resolve_interface(elems, expr, file, scope, owner)
            }
            TypeExprKind::Paren(inner) => self.resolve_type(inner, file, scope, owner),
            TypeExprKind::Instance { base, args } => {
                let base = self.resolve_type(base, file, scope, owner)?;
                let args = args
                    .iter()
                    .map(|arg| self.resolve_type(arg, file, scope, owner))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.ctx.instance(base, args))
            }
            // `[T ~int | ~string]` is short for `[T interface{ ~int | ~string }]`
            TypeExprKind::Union(terms) => {
                let terms = self.resolve_terms(terms, file, scope, owner)?;
                Ok(self.ctx.constraint_interface(Vec::new(), terms))
            }
        }
    }

    fn resolve_terms(
        &mut self,
        terms: &[TypeTerm],
        file: FileId,
        scope: ScopeId,
        owner: &str,
    ) -> Result<Vec<TypeId>, CheckError> {
        terms
            .iter()
            .map(|term| self.resolve_type(&term.ty, file, scope, owner))
            .collect()
    }

    fn resolve_type_name(
        &mut self,
        package: Option<&Ident>,
        name: &Ident,
        file: FileId,
        scope: ScopeId,
    ) -> Result<TypeId, CheckError> {
        let location = Location::new(file, name.span);

        if let Some(package) = package {
            let qualified = format!("{}.{}", package.name, name.name);
            let path = match self.symbols.resolve_from_scope(&package.name, scope) {
                Some(Symbol {
                    kind: SymbolKind::Package,
                    package: Some(path),
                    ..
                }) => path.clone(),
                Some(_) => {
                    return Err(CheckError::Undefined {
                        name: qualified,
                        location,
                    })
                }
                None => {
                    return Err(CheckError::Undefined {
                        name: package.name.clone(),
                        location: Location::new(file, package.span),
                    })
                }
            };

            let info = self.packages.get(&path).cloned().ok_or_else(|| CheckError::Undefined {
                name: qualified.clone(),
                location,
            })?;
            if info.opaque {
                // Members of a package without source are bound on use
                if !name.is_exported() {
                    return Err(CheckError::NotExported {
                        package: info.package.name.clone(),
                        name: name.name.clone(),
                        location,
                    });
                }
                return Ok(self.ctx.opaque_named(&name.name, &info.package));
            }
            let member = info.members.get(&name.name).ok_or_else(|| CheckError::Undefined {
                name: qualified.clone(),
                location,
            })?;
            if !member.is_exported() {
                return Err(CheckError::NotExported {
                    package: info.package.name.clone(),
                    name: name.name.clone(),
                    location,
                });
            }
            if !member.kind.is_type() {
                return Err(CheckError::NotAType {
                    name: qualified,
                    location,
                });
            }
            return member.ty.ok_or(CheckError::Undefined {
                name: qualified,
                location,
            });
        }

        let symbol = self
            .symbols
            .resolve_from_scope(&name.name, scope)
            .cloned()
            .ok_or_else(|| CheckError::Undefined {
                name: name.name.clone(),
                location,
            })?;
        if !symbol.kind.is_type() {
            return Err(CheckError::NotAType {
                name: name.name.clone(),
                location,
            });
        }
        match symbol.ty {
            Some(ty) => Ok(ty),
            // A local alias referenced before its own resolution
            None => Ok(self
                .resolve_type_decl(&name.name)
                .unwrap_or_else(|| self.ctx.empty_interface())),
        }
    }

    fn resolve_signature(
        &mut self,
        func: &FuncType,
        file: FileId,
        scope: ScopeId,
        owner: &str,
    ) -> Result<TypeId, CheckError> {
        let mut params = Vec::with_capacity(func.params.len());
        let last = func.params.len().saturating_sub(1);
        for (i, param) in func.params.iter().enumerate() {
            let mut ty = self.resolve_type(&param.ty, file, scope, owner)?;
            if func.variadic && i == last {
                ty = self.ctx.slice(ty);
            }
            params.push(Var::new(param.name.as_ref().map(|n| n.name.clone()), ty));
        }

        let mut results = Vec::with_capacity(func.results.len());
        for result in &func.results {
            let ty = self.resolve_type(&result.ty, file, scope, owner)?;
            results.push(Var::new(result.name.as_ref().map(|n| n.name.clone()), ty));
        }

        Ok(self.ctx.signature(params, results, func.variadic))
    }

    fn resolve_struct(
        &mut self,
        decls: &[FieldDecl],
        file: FileId,
        scope: ScopeId,
        owner: &str,
    ) -> Result<TypeId, CheckError> {
        let mut fields = Vec::new();
        let mut seen = FxHashSet::default();

        for decl in decls {
            let ty = self.resolve_type(&decl.ty, file, scope, owner)?;
            let names: Vec<(String, Location)> = if decl.embedded {
                vec![(
                    embedded_field_name(&decl.ty),
                    Location::new(file, decl.ty.span),
                )]
            } else {
                decl.names
                    .iter()
                    .map(|n| (n.name.clone(), Location::new(file, n.span)))
                    .collect()
            };

            for (name, location) in names {
                if name != "_" && !seen.insert(name.clone()) {
                    self.errors
                        .push(CheckError::DuplicateField { name, location });
                    continue;
                }
                fields.push(Field {
                    name,
                    ty,
                    embedded: decl.embedded,
                    tag: decl.tag.clone(),
                });
            }
        }

        Ok(self.ctx.struct_type(fields))
    }

    fn resolve_interface(
        &mut self,
        elems: &[InterfaceElem],
        expr: &TypeExpr,
        file: FileId,
        scope: ScopeId,
        owner: &str,
    ) -> Result<TypeId, CheckError> {
        let mut methods: Vec<Method> = Vec::new();
        let mut embeddeds = Vec::new();
        let mut constraint = false;

        for elem in elems {
            match elem {
                InterfaceElem::Method { name, signature } => {
                    let sig = self.resolve_signature(signature, file, scope, owner)?;
                    if methods.iter().any(|m| m.name == name.name) {
                        self.errors.push(CheckError::DuplicateMethod {
                            owner: owner.to_string(),
                            method: name.name.clone(),
                            location: Location::new(file, name.span),
                        });
                        continue;
                    }
                    methods.push(Method {
                        name: name.name.clone(),
                        signature: sig,
                    });
                }
                InterfaceElem::Embed(embedded) => {
                    let ty = self.resolve_type(embedded, file, scope, owner)?;
                    // A literal or predeclared non-interface type is a type term
                    constraint |= !matches!(
                        self.ctx.get(ty),
                        Type::Named(_) | Type::Instance { .. } | Type::Interface(_)
                    );
                    embeddeds.push(ty);
                }
                InterfaceElem::TypeSet(terms) => {
                    let terms = self.resolve_terms(terms, file, scope, owner)?;
                    embeddeds.extend(terms);
                    constraint = true;
                }
            }
        }

        let ty = if constraint {
            self.ctx.constraint_interface(methods, embeddeds)
        } else {
            self.ctx.interface(methods, embeddeds)
        };
        self.interfaces.push(InterfaceSite {
            name: owner.to_string(),
            ty,
            location: Location::new(file, expr.span),
        });
        Ok(ty)
    }

    // ========================================================================
    // Functions, methods and values
    // ========================================================================

    fn bind_signatures_and_values(&mut self, files: &[SourceFile]) {
        let mut methods: FxHashMap<(TypeId, String), Location> = FxHashMap::default();

        for (file, source) in files.iter().enumerate() {
            let scope = self.file_scopes[file];
            for decl in &source.decls {
                match decl {
                    Decl::Func(func) => self.bind_func(func, file, scope, &mut methods),
                    Decl::Var(specs) => {
                        for spec in specs {
                            self.bind_value_type(spec, spec.ty.as_ref(), file, scope);
                        }
                    }
                    Decl::Const(specs) => {
                        let mut last_ty = None;
                        for spec in specs {
                            if !spec.values.is_empty() {
                                last_ty = spec.ty.as_ref();
                            }
                            self.bind_value_type(spec, last_ty, file, scope);
                        }
                    }
                    Decl::Type(_) => {}
                }
            }
        }
    }

    fn bind_value_type(
        &mut self,
        spec: &ValueSpec,
        ty: Option<&TypeExpr>,
        file: FileId,
        scope: ScopeId,
    ) {
        let Some(ty) = ty else {
            return;
        };
        let owner = spec.names.first().map(|n| n.name.clone()).unwrap_or_default();
        match self.resolve_type(ty, file, scope, &owner) {
            Ok(ty) => {
                let package_scope = self.symbols.package_scope_id();
                for name in &spec.names {
                    let declared_here = self
                        .symbols
                        .lookup_package(&name.name)
                        .and_then(|s| s.location)
                        .is_some_and(|l| l == Location::new(file, name.span));
                    if declared_here {
                        self.symbols.update_type(package_scope, &name.name, ty);
                    }
                }
            }
            Err(err) => self.errors.push(err),
        }
    }

    fn bind_func(
        &mut self,
        func: &FuncDecl,
        file: FileId,
        scope: ScopeId,
        methods: &mut FxHashMap<(TypeId, String), Location>,
    ) {
        let owner = match &func.receiver {
            Some(receiver) => format!("{}.{}", receiver.base.name, func.name.name),
            None => func.name.name.clone(),
        };
        let mut sig_scope = scope;
        if !func.type_params.is_empty() {
            sig_scope = self.bind_type_params(&func.type_params, file, scope, &owner);
        } else if let Some(receiver) = func.receiver.as_ref().filter(|r| !r.type_args.is_empty()) {
            sig_scope = self.symbols.push_scope(ScopeKind::TypeParams, scope);
            for name in &receiver.type_args {
                self.bind_type_param(sig_scope, name, file);
            }
        }
        let signature = match self.resolve_signature(&func.signature, file, sig_scope, &owner) {
            Ok(sig) => Some(sig),
            Err(err) => {
                self.errors.push(err);
                None
            }
        };

        let Some(receiver) = &func.receiver else {
            let location = Location::new(file, func.name.span);
            let declared_here = self
                .symbols
                .lookup_package(&func.name.name)
                .is_some_and(|s| s.location == Some(location));
            if let (true, Some(sig)) = (declared_here, signature) {
                let package_scope = self.symbols.package_scope_id();
                self.symbols.update_type(package_scope, &func.name.name, sig);
            }
            return;
        };

        if let Err(err) = self.check_receiver(receiver, file, scope) {
            self.errors.push(err);
            return;
        }
        if func.name.is_blank() {
            return;
        }

        let Some(base) = self.symbols.lookup_package(&receiver.base.name).and_then(|s| s.ty)
        else {
            return;
        };
        let location = Location::new(file, func.name.span);
        if methods
            .insert((base, func.name.name.clone()), location)
            .is_some()
        {
            self.errors.push(CheckError::DuplicateMethod {
                owner: receiver.base.name.clone(),
                method: func.name.name.clone(),
                location,
            });
        }
    }

    /// The receiver base must be a type declared in this package whose
    /// underlying type is neither a pointer nor an interface.
    fn check_receiver(
        &mut self,
        receiver: &Receiver,
        file: FileId,
        scope: ScopeId,
    ) -> Result<(), CheckError> {
        let name = &receiver.base.name;
        let location = Location::new(file, receiver.base.span);

        let Some(symbol) = self.symbols.lookup_package(name) else {
            // Names from the universe or an import are not local types
            return Err(match self.symbols.resolve_from_scope(name, scope) {
                Some(s) if s.kind.is_type() => CheckError::InvalidReceiver {
                    name: name.clone(),
                    reason: "cannot define new methods on non-local type".to_string(),
                    location,
                },
                _ => CheckError::Undefined {
                    name: name.clone(),
                    location,
                },
            });
        };
        if !symbol.kind.is_type() {
            return Err(CheckError::NotAType {
                name: name.clone(),
                location,
            });
        }
        let Some(ty) = symbol.ty else {
            // Unresolved alias, already reported
            return Ok(());
        };

        let invalid = |reason: &str| CheckError::InvalidReceiver {
            name: name.clone(),
            reason: reason.to_string(),
            location,
        };
        let Some(named) = self.ctx.as_named(ty) else {
            return Err(invalid("not a defined type"));
        };
        if named.package.as_ref() != Some(&self.package) {
            return Err(invalid("cannot define new methods on non-local type"));
        }
        let expected = named.type_params.len();
        if receiver.type_args.len() != expected {
            return Err(invalid(&if expected == 0 {
                "not a generic type".to_string()
            } else {
                format!("generic type needs {} type parameters", expected)
            }));
        }
        match self.ctx.underlying(ty).map(|u| self.ctx.get(u)) {
            Ok(Type::Pointer(_)) => Err(invalid("pointer or interface type")),
            Ok(Type::Interface(_)) => Err(invalid("pointer or interface type")),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Whole-package checks
    // ========================================================================

    /// Compute the method set of every interface to surface embedding of
    /// non-interfaces, embedding cycles and conflicting duplicate methods.
    fn check_interfaces(&mut self) {
        let mut reported: Vec<TypeError> = Vec::new();
        let sites = std::mem::take(&mut self.interfaces);

        for site in sites {
            match self.ctx.method_set(site.ty) {
                Ok(_) => {}
                Err(TypeError::CircularReference { cycle }) => {
                    let members = cycle.split(" -> ").map(str::to_string).collect();
                    self.report_cycle(members, site.location);
                }
                // Only an interface someone asks to implement needs these
                Err(TypeError::Opaque { .. } | TypeError::Generic { .. }) => {}
                Err(err) => {
                    if reported.contains(&err) {
                        continue;
                    }
                    reported.push(err.clone());
                    self.errors.push(CheckError::InvalidInterface {
                        name: site.name,
                        error: err,
                        location: site.location,
                    });
                }
            }
        }
    }

    /// A type may not contain itself by value through struct fields or
    /// array elements.
    fn check_value_cycles(&mut self, files: &[SourceFile]) {
        for (file, source) in files.iter().enumerate() {
            for spec in source.type_specs() {
                if spec.alias {
                    continue;
                }
                let Some(ty) = self
                    .symbols
                    .lookup_package(&spec.name.name)
                    .filter(|s| s.location == Some(Location::new(file, spec.name.span)))
                    .and_then(|s| s.ty)
                else {
                    continue;
                };

                // Cycles not starting here are reported from their own members
                let mut path = Vec::new();
                let cycle = self
                    .value_cycle(ty, &mut path)
                    .filter(|cycle| cycle.first() == Some(&ty));
                if let Some(cycle) = cycle {
                    let names = cycle
                        .iter()
                        .filter_map(|&id| self.ctx.as_named(id).map(|n| n.name.clone()))
                        .collect();
                    self.report_cycle(names, Location::new(file, spec.name.span));
                }
            }
        }
    }

    fn value_cycle(&self, ty: TypeId, path: &mut Vec<TypeId>) -> Option<Vec<TypeId>> {
        match self.ctx.get(ty) {
            Type::Named(id) => {
                let named = self.ctx.named(*id);
                if named.package.as_ref() != Some(&self.package) {
                    return None;
                }
                if let Some(start) = path.iter().position(|&seen| seen == ty) {
                    let mut cycle = path[start..].to_vec();
                    cycle.push(ty);
                    return Some(cycle);
                }
                let underlying = named.underlying?;
                path.push(ty);
                let found = self.value_cycle(underlying, path);
                path.pop();
                found
            }
            Type::Struct(st) => st
                .fields
                .iter()
                .find_map(|field| self.value_cycle(field.ty, path)),
            Type::Array { elem, .. } => self.value_cycle(*elem, path),
            _ => None,
        }
    }
}

/// Field name of an embedded field: the type name without package or `*`.
fn embedded_field_name(ty: &TypeExpr) -> String {
    let mut ty = ty.unparen();
    if let TypeExprKind::Pointer(elem) = &ty.kind {
        ty = elem.unparen();
    }
    match &ty.kind {
        TypeExprKind::Name { name, .. } => name.name.clone(),
        TypeExprKind::Instance { base, .. } => embedded_field_name(base),
        _ => "_".to_string(),
    }
}
