//! Generation requests
//!
//! A `GenerateRequest` carries every setting of one invocation. The
//! pipeline only reads the request; it never consults flags or the
//! environment.

use crate::error::ConcreteError;
use concrete_checker::LoaderConfig;
use concrete_parser::{is_identifier, is_keyword};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Template used when none is given.
pub const DEFAULT_TEMPLATE: &str = "{{.Interface}}Impl";

/// Receiver identifier used when none is given.
pub const DEFAULT_RECEIVER: &str = "t";

/// Where a package comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Every Go file of a directory
    Dir(PathBuf),
    /// One in-memory file
    Text { name: String, text: String },
}

impl SourceSpec {
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        SourceSpec::Dir(path.into())
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceSpec::Text {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Whether the rendered text must compile as a file of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Emit import lines for every package the stubs reference
    #[default]
    Standalone,
    /// Text is appended to an existing file; no imports
    SameUnit,
}

/// Name template for the concrete type.
///
/// The only variable is `{{.Interface}}`, the interface name. Spaces inside
/// the braces are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
}

fn action_regex() -> &'static Regex {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    ACTION.get_or_init(|| {
        Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("template action regex should compile")
    })
}

impl NameTemplate {
    pub fn parse(template: &str) -> Result<Self, ConcreteError> {
        let invalid = |reason: String| ConcreteError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        for action in action_regex().captures_iter(template) {
            let field = action.get(1).map_or("", |m| m.as_str());
            if field != ".Interface" {
                return Err(invalid(format!(
                    "unknown field {:?}, only .Interface is defined",
                    field
                )));
            }
        }

        let rest = action_regex().replace_all(template, "");
        if rest.contains("{{") {
            return Err(invalid("unclosed action".to_string()));
        }
        if rest.contains("}}") {
            return Err(invalid("unexpected }}".to_string()));
        }

        Ok(Self {
            source: template.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute the interface name.
    pub fn expand(&self, interface: &str) -> String {
        action_regex()
            .replace_all(&self.source, regex::NoExpand(interface))
            .into_owned()
    }

    /// Expand and check that the result can name a Go type.
    pub fn type_name(&self, interface: &str) -> Result<String, ConcreteError> {
        let name = self.expand(interface);
        validate_identifier(&name)?;
        Ok(name)
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Check that `name` is a Go identifier other than a keyword or `_`.
pub fn validate_identifier(name: &str) -> Result<(), ConcreteError> {
    let reason = if name.is_empty() {
        "empty name"
    } else if is_keyword(name) {
        "Go keyword"
    } else if name == "_" {
        "blank identifier"
    } else if !is_identifier(name) {
        "not a Go identifier"
    } else {
        return Ok(());
    };
    Err(ConcreteError::InvalidTypeName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Everything one generation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Interface to implement; exact, case-sensitive
    pub interface: String,
    /// Package declaring the interface
    pub source: SourceSpec,
    /// Name of the new type
    pub type_name: String,
    /// Destination package name; `None` means the interface's package
    pub package: Option<String>,
    /// Separately loaded destination package checked for name conflicts
    pub destination: Option<SourceSpec>,
    pub mode: RenderMode,
    /// Receiver identifier of the generated methods
    pub receiver: String,
    pub loader: LoaderConfig,
}

impl GenerateRequest {
    /// A request with default settings: the type is named
    /// `<Interface>Impl`, rendered standalone into the interface's package.
    pub fn new(interface: impl Into<String>, source: SourceSpec) -> Self {
        let interface = interface.into();
        let type_name = NameTemplate::default().expand(&interface);
        Self {
            interface,
            source,
            type_name,
            package: None,
            destination: None,
            mode: RenderMode::default(),
            receiver: DEFAULT_RECEIVER.to_string(),
            loader: LoaderConfig::default(),
        }
    }

    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = name.into();
        self
    }

    /// Name the type by expanding a template.
    pub fn with_template(mut self, template: &NameTemplate) -> Self {
        self.type_name = template.expand(&self.interface);
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_destination(mut self, destination: SourceSpec) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    /// Check the names the request introduces into generated code.
    pub fn validate(&self) -> Result<(), ConcreteError> {
        validate_identifier(&self.type_name)?;
        validate_identifier(&self.receiver)
    }
}
