//! Package loading
//!
//! A package is every `.go` file of one directory (or a single in-memory
//! source). Files are parsed individually, then bound together so names
//! resolve across files.

use crate::binder::Binder;
use crate::error::{CheckFailure, LoadError, ParseFailure};
use crate::importer::SourceImporter;
use crate::source::SourceMap;
use crate::unit::CompilationUnit;
use concrete_parser::{parse_source, SourceFile};
use concrete_types::{PackageRef, TypeContext};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Loader options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Also load `_test.go` files
    pub include_tests: bool,
}

/// Loads and checks packages.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    config: LoaderConfig,
}

impl SourceLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the package in `dir`.
    #[tracing::instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path) -> Result<CompilationUnit, LoadError> {
        let sources = read_dir_sources(dir, &self.config)?;
        let root = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let importer = SourceImporter::new(self.config.clone()).with_root(&root);
        self.check(
            sources,
            dir.display().to_string(),
            Some(dir.to_path_buf()),
            importer,
        )
    }

    /// Load a package from a single source text. `name` is used as the
    /// file name in diagnostics and as the package path. Relative imports
    /// cannot be resolved without a directory.
    #[tracing::instrument(skip(self, text))]
    pub fn load_source(&self, name: &str, text: &str) -> Result<CompilationUnit, LoadError> {
        let mut sources = SourceMap::new();
        sources.add(name, text);
        self.check(
            sources,
            name.to_string(),
            None,
            SourceImporter::new(self.config.clone()),
        )
    }

    fn check(
        &self,
        sources: SourceMap,
        path: String,
        dir: Option<PathBuf>,
        mut importer: SourceImporter,
    ) -> Result<CompilationUnit, LoadError> {
        let files = parse_files(&sources)?;
        let name = files
            .first()
            .map(|file| file.package.name.clone())
            .unwrap_or_default();
        let package = PackageRef::new(name, path);
        debug!(package = %package.name, files = files.len(), "parsed package");

        let mut ctx = TypeContext::new();
        let bound = Binder::new(&mut ctx, &mut importer, package.clone(), dir.as_deref())
            .bind(&files)
            .map_err(|errors| {
                LoadError::TypeCheck(CheckFailure {
                    sources: sources.clone(),
                    errors,
                })
            })?;

        Ok(CompilationUnit::new(package, dir, files, sources, bound, ctx))
    }
}

/// Parse every file of a source map, collecting all parse errors.
pub(crate) fn parse_files(sources: &SourceMap) -> Result<Vec<SourceFile>, LoadError> {
    let mut files = Vec::with_capacity(sources.len());
    let mut errors = Vec::new();

    for file in 0..sources.len() {
        let text = sources.source(file).unwrap_or_default();
        match parse_source(text) {
            Ok(parsed) => files.push(parsed),
            Err(errs) => errors.extend(errs.into_iter().map(|err| (file, err))),
        }
    }

    if errors.is_empty() {
        Ok(files)
    } else {
        Err(LoadError::Parse(ParseFailure {
            sources: sources.clone(),
            errors,
        }))
    }
}

/// Read the Go files of a directory, sorted by file name.
///
/// Files whose names start with `_` or `.` are ignored, as are `_test.go`
/// files unless the configuration includes them.
pub(crate) fn read_dir_sources(dir: &Path, config: &LoaderConfig) -> Result<SourceMap, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let pattern = format!(
        "{}/*.go",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|err| LoadError::Io {
        path: dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| LoadError::Io {
            path: err.path().to_path_buf(),
            source: err.into(),
        })?;
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('_') || file_name.starts_with('.') {
            continue;
        }
        if file_name.ends_with("_test.go") && !config.include_tests {
            trace!(file = file_name, "skipping test file");
            continue;
        }
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if paths.is_empty() {
        return Err(LoadError::NoSourceFiles {
            dir: dir.to_path_buf(),
        });
    }

    let mut sources = SourceMap::new();
    for path in paths {
        let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        trace!(file = %path.display(), bytes = text.len(), "read source file");
        sources.add(path.display().to_string(), text);
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_source() {
        let unit = SourceLoader::default()
            .load_source(
                "rdr.go",
                "package temperature\n\ntype Rdr interface {\n\tGet() (string, error)\n\tSet(string) error\n}\n",
            )
            .unwrap();
        assert_eq!(unit.package().name, "temperature");
        assert_eq!(unit.package().path, "rdr.go");
        assert!(unit.lookup("Rdr").is_some());
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let err = SourceLoader::default()
            .load_source("bad.go", "package p\n\ntype A interface {\n\tM(\n}\n")
            .unwrap_err();
        match err {
            LoadError::Parse(failure) => {
                assert!(!failure.errors.is_empty());
                assert!(failure.summary().starts_with("bad.go:"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_dir_file_selection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.go"), "package p\n\ntype B int\n").unwrap();
        fs::write(dir.path().join("a.go"), "package p\n\ntype A int\n").unwrap();
        fs::write(dir.path().join("a_test.go"), "package p\n\ntype T int\n").unwrap();
        fs::write(dir.path().join("_ignored.go"), "not go at all").unwrap();
        fs::write(dir.path().join("notes.txt"), "not go either").unwrap();

        let sources = read_dir_sources(dir.path(), &LoaderConfig::default()).unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources.name(0).ends_with("a.go"));
        assert!(sources.name(1).ends_with("b.go"));

        let with_tests = LoaderConfig {
            include_tests: true,
        };
        assert_eq!(read_dir_sources(dir.path(), &with_tests).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceLoader::default().load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoSourceFiles { .. }));
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceLoader::default()
            .load_dir(&dir.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
