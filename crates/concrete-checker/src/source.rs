//! Source text of loaded files, kept for diagnostics.

use codespan_reporting::files::SimpleFiles;

/// Index of a file inside a `SourceMap`.
pub type FileId = usize;

/// The files of one package, in load order.
#[derive(Debug, Clone)]
pub struct SourceMap {
    files: SimpleFiles<String, String>,
    names: Vec<String>,
}

impl Default for SourceMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            names: Vec::new(),
        }
    }

    /// Register a file, returning its id.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> FileId {
        let name = name.into();
        self.names.push(name.clone());
        self.files.add(name, source.into())
    }

    /// Display name of a file, or `<unknown>` for a foreign id.
    pub fn name(&self, file: FileId) -> &str {
        self.names.get(file).map(String::as_str).unwrap_or("<unknown>")
    }

    /// Source text of a file.
    pub fn source(&self, file: FileId) -> Option<&str> {
        self.files.get(file).ok().map(|f| f.source().as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Borrow the underlying codespan file database.
    pub fn files(&self) -> &SimpleFiles<String, String> {
        &self.files
    }
}
