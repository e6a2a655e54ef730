//! Symbol table implementation for name resolution
//!
//! Scopes form a tree: the universe scope holds the predeclared types, the
//! package scope holds every top-level declaration, and one file scope per
//! source file holds that file's imports.

use crate::error::Location;
use concrete_types::TypeId;
use rustc_hash::FxHashMap;

/// Symbol kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `type T ...`, or a predeclared type
    Type,
    /// `type T = ...`
    Alias,
    /// Top-level function
    Func,
    /// Package-level variable
    Var,
    /// Package-level constant
    Const,
    /// An imported package name
    Package,
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Alias => "type alias",
            SymbolKind::Func => "func",
            SymbolKind::Var => "var",
            SymbolKind::Const => "const",
            SymbolKind::Package => "package",
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, SymbolKind::Type | SymbolKind::Alias)
    }
}

/// Symbol information
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Symbol name
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// The denoted type for types and aliases, the declared type for
    /// explicitly typed values; `None` until resolved or when unknown
    pub ty: Option<TypeId>,
    /// For package names: the identity path of the imported package
    pub package: Option<String>,
    /// Scope where this symbol was defined
    pub scope_id: ScopeId,
    /// Declaration site; `None` for predeclared symbols
    pub location: Option<Location>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, location: Option<Location>) -> Self {
        Symbol {
            name: name.into(),
            kind,
            ty: None,
            package: None,
            scope_id: ScopeId(0),
            location,
        }
    }

    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }

    /// True if the name starts with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Scope kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Predeclared identifiers
    Universe,
    /// Top-level declarations of one package
    Package,
    /// Imports of one file
    File,
    /// Type parameters of a generic declaration
    TypeParams,
}

/// Scope in the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    /// Scope ID
    pub id: ScopeId,
    /// Scope kind
    pub kind: ScopeKind,
    /// Parent scope (None for the universe scope)
    pub parent: Option<ScopeId>,
    /// Symbols defined in this scope
    pub symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            id,
            kind,
            parent,
            symbols: FxHashMap::default(),
        }
    }
}

/// Error returned when defining a name twice in one scope
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSymbolError {
    pub name: String,
    pub original: Option<Location>,
    pub duplicate: Option<Location>,
}

/// Symbol table with scope tree
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// All scopes (indexed by ScopeId)
    scopes: Vec<Scope>,
    /// The package scope
    package_scope: ScopeId,
}

impl SymbolTable {
    /// Universe scope id
    pub const UNIVERSE: ScopeId = ScopeId(0);

    /// Create a table with a universe scope and an empty package scope.
    pub fn new() -> Self {
        let universe = Scope::new(Self::UNIVERSE, ScopeKind::Universe, None);
        let package = Scope::new(ScopeId(1), ScopeKind::Package, Some(Self::UNIVERSE));
        SymbolTable {
            scopes: vec![universe, package],
            package_scope: ScopeId(1),
        }
    }

    pub fn package_scope_id(&self) -> ScopeId {
        self.package_scope
    }

    /// Add a new scope under `parent`, returning its id.
    pub fn push_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, kind, Some(parent)));
        id
    }

    /// Define a symbol in a specific scope
    ///
    /// Returns an error if a symbol with the same name already exists in that scope.
    pub fn define_in_scope(
        &mut self,
        scope_id: ScopeId,
        mut symbol: Symbol,
    ) -> Result<(), DuplicateSymbolError> {
        let scope = &mut self.scopes[scope_id.0 as usize];

        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(DuplicateSymbolError {
                name: symbol.name.clone(),
                original: existing.location,
                duplicate: symbol.location,
            });
        }

        symbol.scope_id = scope_id;
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Resolve a symbol by name from a specific scope, walking up the scope chain
    pub fn resolve_from_scope(&self, name: &str, mut scope_id: ScopeId) -> Option<&Symbol> {
        loop {
            let scope = self.scopes.get(scope_id.0 as usize)?;

            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }

            match scope.parent {
                Some(parent) => scope_id = parent,
                None => return None,
            }
        }
    }

    /// Look up a name in one scope only.
    pub fn lookup_in_scope(&self, name: &str, scope_id: ScopeId) -> Option<&Symbol> {
        self.scopes
            .get(scope_id.0 as usize)
            .and_then(|scope| scope.symbols.get(name))
    }

    /// Look up a top-level declaration of the package.
    pub fn lookup_package(&self, name: &str) -> Option<&Symbol> {
        self.lookup_in_scope(name, self.package_scope)
    }

    /// Update the type of a symbol in a specific scope
    ///
    /// Returns true if the symbol was found and updated.
    pub fn update_type(&mut self, scope_id: ScopeId, name: &str, new_ty: TypeId) -> bool {
        if let Some(scope) = self.scopes.get_mut(scope_id.0 as usize) {
            if let Some(symbol) = scope.symbols.get_mut(name) {
                symbol.ty = Some(new_ty);
                return true;
            }
        }
        false
    }

    /// Get a scope by ID
    pub fn get_scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Top-level declarations sorted by name.
    pub fn package_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.get_scope(self.package_scope).symbols.values().collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
