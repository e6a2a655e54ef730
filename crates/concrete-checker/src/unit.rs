//! The checked form of one package

use crate::binder::BoundPackage;
use crate::source::{FileId, SourceMap};
use crate::symbols::{ScopeId, Symbol, SymbolTable};
use concrete_parser::SourceFile;
use concrete_types::{PackageRef, TypeContext};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// A parsed and checked package. Immutable once built.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    package: PackageRef,
    dir: Option<PathBuf>,
    /// Canonical form of `dir`, the base of relative import paths
    root: Option<PathBuf>,
    files: Vec<SourceFile>,
    sources: SourceMap,
    symbols: SymbolTable,
    file_scopes: Vec<ScopeId>,
    ctx: TypeContext,
    import_paths: FxHashMap<String, String>,
}

impl CompilationUnit {
    pub(crate) fn new(
        package: PackageRef,
        dir: Option<PathBuf>,
        files: Vec<SourceFile>,
        sources: SourceMap,
        bound: BoundPackage,
        ctx: TypeContext,
    ) -> Self {
        let root = dir
            .as_ref()
            .map(|dir| dir.canonicalize().unwrap_or_else(|_| dir.clone()));
        Self {
            package,
            dir,
            root,
            files,
            sources,
            symbols: bound.symbols,
            file_scopes: bound.file_scopes,
            ctx,
            import_paths: bound.import_paths,
        }
    }

    /// Name and identity path of the package.
    pub fn package(&self) -> &PackageRef {
        &self.package
    }

    /// Directory the package was loaded from, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn ctx(&self) -> &TypeContext {
        &self.ctx
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Scope holding the imports of one file.
    pub fn file_scope(&self, file: FileId) -> Option<ScopeId> {
        self.file_scopes.get(file).copied()
    }

    /// Exact, case-sensitive lookup in the package scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.lookup_package(name)
    }

    /// Every package-scope declaration, sorted by name.
    pub fn package_symbols(&self) -> Vec<&Symbol> {
        self.symbols.package_symbols()
    }

    /// Import path to write for a package referenced by this unit: the
    /// path as written in an import declaration, or, for packages only
    /// reached transitively, the package identity. Relative packages are
    /// identified by their directory, which is written relative to this
    /// unit's directory.
    pub fn import_path_for(&self, package: &PackageRef) -> String {
        if let Some(path) = self.import_paths.get(&package.path) {
            return path.clone();
        }
        let target = Path::new(&package.path);
        match &self.root {
            Some(root) if target.is_absolute() => {
                relative_import_path(target, root).unwrap_or_else(|| package.path.clone())
            }
            _ => package.path.clone(),
        }
    }
}

/// `./b/c` or `../shared` for the directory `target` seen from `root`.
fn relative_import_path(target: &Path, root: &Path) -> Option<String> {
    let diff = pathdiff::diff_paths(target, root)?;
    let elems: Vec<String> = diff
        .components()
        .map(|elem| elem.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = elems.join("/");
    Some(if joined.is_empty() {
        ".".to_string()
    } else if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    })
}
