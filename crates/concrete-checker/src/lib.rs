//! Package loader and declaration checker for Go sources.
//!
//! Loads a directory (or a single source text) into a [`CompilationUnit`]:
//! every file parsed, imports resolved, declarations bound and checked.
//!
//! # Example
//!
//! ```
//! use concrete_checker::SourceLoader;
//!
//! let unit = SourceLoader::default()
//!     .load_source("shape.go", "package shapes\n\ntype Shape interface {\n\tArea() float64\n}\n")
//!     .unwrap();
//! let shape = unit.lookup("Shape").unwrap();
//! assert!(unit.ctx().is_interface(shape.ty.unwrap()));
//! ```

pub mod binder;
pub mod consts;
pub mod diagnostic;
pub mod error;
pub mod importer;
pub mod loader;
pub mod source;
pub mod symbols;
pub mod unit;

pub use diagnostic::{load_diagnostics, Diagnostic, ErrorCode, JsonDiagnostic};
pub use error::{CheckError, CheckFailure, LoadError, Location, ParseFailure};
pub use importer::{ImportError, Importer, PackageInfo, SourceImporter, StdLibrary};
pub use loader::{LoaderConfig, SourceLoader};
pub use source::{FileId, SourceMap};
pub use symbols::{Symbol, SymbolKind, SymbolTable};
pub use unit::CompilationUnit;
