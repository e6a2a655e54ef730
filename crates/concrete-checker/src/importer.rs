//! Import path resolution
//!
//! Standard library packages are served from declaration stubs compiled
//! into the binary. Relative paths (`./x`, `../x`) are loaded from disk
//! next to the importing package. Every other path, including standard
//! packages without a stub, is an opaque package: it imports fine, and
//! its members are bound as opaque types when a declaration names them.

use crate::binder::Binder;
use crate::loader::{parse_files, read_dir_sources, LoaderConfig};
use crate::source::SourceMap;
use crate::symbols::Symbol;
use concrete_types::{PackageRef, TypeContext};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

/// Exported view of an imported package.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub package: PackageRef,
    /// Package-scope declarations, locations stripped
    pub members: FxHashMap<String, Symbol>,
    /// No source is available; `members` is empty
    pub opaque: bool,
}

impl PackageInfo {
    /// A package known only by its path.
    pub fn opaque(package: PackageRef) -> Self {
        Self {
            package,
            members: FxHashMap::default(),
            opaque: true,
        }
    }

    /// Look up an exported member.
    pub fn exported(&self, name: &str) -> Option<&Symbol> {
        self.members.get(name).filter(|symbol| symbol.is_exported())
    }

    /// Exported members sorted by name.
    pub fn exported_members(&self) -> Vec<&Symbol> {
        let mut members: Vec<&Symbol> = self
            .members
            .values()
            .filter(|symbol| symbol.is_exported())
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }
}

/// Errors that can occur while importing a package
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    #[error("import cycle not allowed: {cycle}")]
    Cycle { cycle: String },

    #[error("relative import {path} needs a package directory")]
    RelativeWithoutDir { path: String },

    #[error("{message}")]
    Failed { path: String, message: String },
}

/// Resolves import paths to checked packages.
///
/// All packages returned by one importer share the `TypeContext` passed
/// in, so an importer must not be reused across contexts.
pub trait Importer {
    fn import(
        &mut self,
        path: &str,
        from_dir: Option<&Path>,
        ctx: &mut TypeContext,
    ) -> Result<Rc<PackageInfo>, ImportError>;
}

/// Declaration stubs bundled for standard library packages.
pub struct StdLibrary;

impl StdLibrary {
    const PACKAGES: &'static [(&'static str, &'static str, &'static str)] = &[
        ("bufio", "bufio.go", include_str!("../std/bufio.go")),
        ("bytes", "bytes.go", include_str!("../std/bytes.go")),
        ("context", "context.go", include_str!("../std/context.go")),
        ("encoding/json", "json.go", include_str!("../std/json.go")),
        ("errors", "errors.go", include_str!("../std/errors.go")),
        ("fmt", "fmt.go", include_str!("../std/fmt.go")),
        ("io", "io.go", include_str!("../std/io.go")),
        ("io/fs", "fs.go", include_str!("../std/fs.go")),
        ("net", "net.go", include_str!("../std/net.go")),
        ("net/http", "http.go", include_str!("../std/http.go")),
        ("net/url", "url.go", include_str!("../std/url.go")),
        ("os", "os.go", include_str!("../std/os.go")),
        ("sort", "sort.go", include_str!("../std/sort.go")),
        ("strings", "strings.go", include_str!("../std/strings.go")),
        ("sync", "sync.go", include_str!("../std/sync.go")),
        ("time", "time.go", include_str!("../std/time.go")),
        ("unsafe", "unsafe.go", include_str!("../std/unsafe.go")),
    ];

    /// File name and source of a standard package.
    pub fn get(path: &str) -> Option<(&'static str, &'static str)> {
        Self::PACKAGES
            .iter()
            .find(|(import_path, _, _)| *import_path == path)
            .map(|(_, file, source)| (*file, *source))
    }

    /// Import paths of every bundled package.
    pub fn paths() -> impl Iterator<Item = &'static str> {
        Self::PACKAGES.iter().map(|(path, _, _)| *path)
    }
}

/// The name the package at a non-relative `path` most likely declares:
/// the last path element that is not a major version (`/v2`), without a
/// `go-` prefix or `-go` suffix, cut at the first `.` or `-`.
pub fn guess_package_name(path: &str) -> String {
    let mut elems = path.rsplit('/').filter(|elem| !elem.is_empty());
    let mut last = elems.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(prev) = elems.next() {
            last = prev;
        }
    }

    let last = last.strip_prefix("go-").unwrap_or(last);
    let last = last.strip_suffix("-go").unwrap_or(last);
    let name: String = last
        .split(|c: char| c == '.' || c == '-')
        .next()
        .unwrap_or(last)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// True for `./x`, `../x`, `.` and `..`.
pub fn is_relative(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../")
}

/// Importer over the bundled standard library and relative directories.
/// Anything else resolves to an opaque package.
pub struct SourceImporter {
    config: LoaderConfig,
    cache: FxHashMap<String, Rc<PackageInfo>>,
    /// Keys of packages being checked, outermost first
    in_progress: Vec<String>,
}

impl SourceImporter {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            cache: FxHashMap::default(),
            in_progress: Vec::new(),
        }
    }

    /// Mark the package being loaded so imports that lead back to it are
    /// reported as cycles.
    pub fn with_root(mut self, dir: &Path) -> Self {
        self.in_progress.push(dir_key(dir));
        self
    }

    fn import_std(
        &mut self,
        path: &str,
        ctx: &mut TypeContext,
    ) -> Result<Rc<PackageInfo>, ImportError> {
        let Some((file, source)) = StdLibrary::get(path) else {
            let package = PackageRef::new(guess_package_name(path), path);
            debug!(path, name = %package.name, "no source for package, importing it opaque");
            let info = Rc::new(PackageInfo::opaque(package));
            self.cache.insert(path.to_string(), Rc::clone(&info));
            return Ok(info);
        };
        debug!(path, "loading standard library stub");

        let mut sources = SourceMap::new();
        sources.add(format!("$GOROOT/src/{}/{}", path, file), source);
        self.check_package(path.to_string(), path.to_string(), None, sources, ctx)
    }

    fn import_relative(
        &mut self,
        path: &str,
        from_dir: Option<&Path>,
        ctx: &mut TypeContext,
    ) -> Result<Rc<PackageInfo>, ImportError> {
        let from_dir = from_dir.ok_or_else(|| ImportError::RelativeWithoutDir {
            path: path.to_string(),
        })?;
        let dir = from_dir.join(path);
        let dir = dir.canonicalize().unwrap_or(dir);
        let key = dir_key(&dir);
        debug!(path, dir = %dir.display(), "loading relative package");

        let sources = read_dir_sources(&dir, &self.config).map_err(|err| ImportError::Failed {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        self.check_package(key.clone(), key, Some(dir), sources, ctx)
    }

    /// Parse and bind one package, caching the result under `key`.
    fn check_package(
        &mut self,
        key: String,
        identity: String,
        dir: Option<PathBuf>,
        sources: SourceMap,
        ctx: &mut TypeContext,
    ) -> Result<Rc<PackageInfo>, ImportError> {
        let failed = |message: String| ImportError::Failed {
            path: identity.clone(),
            message,
        };

        let files = parse_files(&sources).map_err(|err| failed(err.to_string()))?;
        let name = files
            .first()
            .map(|file| file.package.name.clone())
            .unwrap_or_default();
        let package = PackageRef::new(name, identity.clone());

        self.in_progress.push(key.clone());
        let bound = Binder::new(ctx, self, package.clone(), dir.as_deref()).bind(&files);
        self.in_progress.pop();

        let bound = bound.map_err(|errors| {
            failed(
                crate::error::CheckFailure {
                    sources: sources.clone(),
                    errors,
                }
                .summary(),
            )
        })?;

        let members = bound
            .symbols
            .package_symbols()
            .into_iter()
            .map(|symbol| {
                let mut symbol = symbol.clone();
                symbol.location = None;
                (symbol.name.clone(), symbol)
            })
            .collect();

        let info = Rc::new(PackageInfo {
            package,
            members,
            opaque: false,
        });
        self.cache.insert(key, Rc::clone(&info));
        Ok(info)
    }
}

impl Importer for SourceImporter {
    fn import(
        &mut self,
        path: &str,
        from_dir: Option<&Path>,
        ctx: &mut TypeContext,
    ) -> Result<Rc<PackageInfo>, ImportError> {
        let key = if is_relative(path) {
            match from_dir {
                Some(from) => {
                    let dir = from.join(path);
                    dir_key(&dir.canonicalize().unwrap_or(dir))
                }
                None => {
                    return Err(ImportError::RelativeWithoutDir {
                        path: path.to_string(),
                    })
                }
            }
        } else {
            path.to_string()
        };

        if let Some(info) = self.cache.get(&key) {
            trace!(path, "import cache hit");
            return Ok(Rc::clone(info));
        }

        if let Some(start) = self.in_progress.iter().position(|k| *k == key) {
            let mut cycle: Vec<&str> = self.in_progress[start..].iter().map(String::as_str).collect();
            cycle.push(&key);
            return Err(ImportError::Cycle {
                cycle: cycle.join(" -> "),
            });
        }

        if is_relative(path) {
            self.import_relative(path, from_dir, ctx)
        } else {
            self.import_std(path, ctx)
        }
    }
}

fn dir_key(dir: &Path) -> String {
    dir.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind;

    #[test]
    fn test_std_library_lookup() {
        assert!(StdLibrary::get("io").is_some());
        assert!(StdLibrary::get("net/http").is_some());
        assert!(StdLibrary::get("github.com/x/y").is_none());
        assert!(StdLibrary::paths().any(|p| p == "encoding/json"));
    }

    #[test]
    fn test_relative_paths() {
        assert!(is_relative("./store"));
        assert!(is_relative("../shared"));
        assert!(is_relative(".."));
        assert!(!is_relative("io"));
        assert!(!is_relative(".hidden"));
    }

    #[test]
    fn test_every_std_stub_checks() {
        let mut ctx = TypeContext::new();
        let mut importer = SourceImporter::new(LoaderConfig::default());
        for path in StdLibrary::paths() {
            let info = importer
                .import(path, None, &mut ctx)
                .unwrap_or_else(|err| panic!("{}: {}", path, err));
            assert_eq!(info.package.path, path);
        }
    }

    #[test]
    fn test_import_io_exports() {
        let mut ctx = TypeContext::new();
        let mut importer = SourceImporter::new(LoaderConfig::default());
        let io = importer.import("io", None, &mut ctx).unwrap();
        assert_eq!(io.package.name, "io");

        let reader = io.exported("Reader").unwrap();
        assert_eq!(reader.kind, SymbolKind::Type);
        assert!(ctx.is_interface(reader.ty.unwrap()));
        assert!(io.exported("pipe").is_none());
        assert!(io.members.contains_key("pipe"));
    }

    #[test]
    fn test_imports_are_cached() {
        let mut ctx = TypeContext::new();
        let mut importer = SourceImporter::new(LoaderConfig::default());
        let first = importer.import("fmt", None, &mut ctx).unwrap();
        let second = importer.import("fmt", None, &mut ctx).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_packages_without_source_are_opaque() {
        let mut ctx = TypeContext::new();
        let mut importer = SourceImporter::new(LoaderConfig::default());
        for (path, name) in [
            ("strconv", "strconv"),
            ("math/rand", "rand"),
            ("example.com/mod", "mod"),
            ("github.com/go-chi/chi/v5", "chi"),
            ("github.com/mattn/go-sqlite3", "sqlite3"),
            ("gopkg.in/yaml.v3", "yaml"),
        ] {
            let info = importer.import(path, None, &mut ctx).unwrap();
            assert!(info.opaque, "{}", path);
            assert_eq!(info.package.name, name);
            assert_eq!(info.package.path, path);
            assert!(info.exported_members().is_empty());
        }
        let again = importer.import("strconv", None, &mut ctx).unwrap();
        assert!(again.opaque);
    }

    #[test]
    fn test_unsafe_pointer_is_a_pointer() {
        let mut ctx = TypeContext::new();
        let mut importer = SourceImporter::new(LoaderConfig::default());
        let unsafe_pkg = importer.import("unsafe", None, &mut ctx).unwrap();
        assert!(!unsafe_pkg.opaque);
        let pointer = unsafe_pkg.exported("Pointer").unwrap().ty.unwrap();
        let underlying = ctx.underlying(pointer).unwrap();
        assert!(matches!(ctx.get(underlying), concrete_types::Type::Pointer(_)));
    }

    #[test]
    fn test_relative_without_dir() {
        let mut ctx = TypeContext::new();
        let mut importer = SourceImporter::new(LoaderConfig::default());
        assert_eq!(
            importer.import("./store", None, &mut ctx).unwrap_err(),
            ImportError::RelativeWithoutDir {
                path: "./store".to_string()
            }
        );
    }
}
