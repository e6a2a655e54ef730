//! Output sinks
//!
//! A sink receives the complete generated text in one call; nothing is
//! written until rendering has succeeded.

use crate::error::ConcreteError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Destination of generated text.
pub trait Sink {
    /// Short description used in error messages.
    fn target(&self) -> String;

    fn write_text(&mut self, text: &str) -> Result<(), ConcreteError>;
}

/// Writes to any `io::Write`, such as stdout or a buffer.
pub struct StreamSink<W: Write> {
    name: String,
    stream: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(name: impl Into<String>, stream: W) -> Self {
        Self {
            name: name.into(),
            stream,
        }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn target(&self) -> String {
        self.name.clone()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ConcreteError> {
        let to_render = |source| ConcreteError::Render {
            target: self.name.clone(),
            source,
        };
        self.stream.write_all(text.as_bytes()).map_err(to_render)?;
        self.stream.flush().map_err(to_render)
    }
}

/// Creates a new file. The text goes to a temporary file in the same
/// directory, which is moved into place only once fully written. An
/// existing file is never overwritten, including one that appeared after
/// the conflict check, and a failed write leaves nothing behind.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A sink for `<dir>/<snake_case type name>.go`.
    pub fn for_type(dir: &Path, type_name: &str) -> Self {
        Self::new(dir.join(file_name_for(type_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn target(&self) -> String {
        self.path.display().to_string()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ConcreteError> {
        let to_render = |source| ConcreteError::Render {
            target: self.path.display().to_string(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(to_render)?;
        temp.write_all(text.as_bytes()).map_err(to_render)?;
        temp.as_file().sync_all().map_err(to_render)?;
        temp.persist_noclobber(&self.path)
            .map_err(|err| to_render(err.error))?;
        debug!(path = %self.path.display(), bytes = text.len(), "wrote implementation");
        Ok(())
    }
}

/// Operating systems recognized in `_<GOOS>` file name suffixes.
const GOOS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js",
    "linux", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// Architectures recognized in `_<GOARCH>` file name suffixes.
const GOARCH: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mips64", "mips64le", "mipsle",
    "ppc64", "ppc64le", "riscv64", "s390x", "wasm",
];

/// True when the go tool would treat a file with this stem specially:
/// excluded from builds as a test, or constrained to one platform.
fn has_reserved_suffix(stem: &str) -> bool {
    let Some((_, last)) = stem.rsplit_once('_') else {
        return false;
    };
    last == "test" || GOOS.contains(&last) || GOARCH.contains(&last)
}

/// File name for a type: `MyHTTPRdr` becomes `my_http_rdr.go`. Names the
/// go tool would exclude or constrain, such as `rdr_linux.go`, get an
/// `_impl` suffix.
pub fn file_name_for(type_name: &str) -> String {
    let chars: Vec<char> = type_name.chars().collect();
    let mut name = String::with_capacity(type_name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                name.push('_');
            }
            name.extend(c.to_lowercase());
        } else {
            name.push(c);
        }
    }
    if has_reserved_suffix(&name) {
        name.push_str("_impl");
    }
    name.push_str(".go");
    name
}
