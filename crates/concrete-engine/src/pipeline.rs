//! The generation pipeline
//!
//! Load → resolve → guard and flatten → render → sink. Stages run in
//! order and the first failure ends the run; the sink is only reached
//! with the complete text.

use crate::error::ConcreteError;
use crate::flatten::flatten;
use crate::guard::guard;
use crate::imports::required_imports;
use crate::render::{RenderOptions, StubRenderer, StubTarget};
use crate::request::{GenerateRequest, RenderMode, SourceSpec};
use crate::resolver::{list_interfaces, resolve};
use crate::sink::Sink;
use concrete_checker::{CompilationUnit, LoaderConfig, SourceLoader};
use tracing::debug;

/// The outcome of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub type_name: String,
    /// Package the text declares
    pub package: String,
    pub text: String,
    /// Import paths referenced by the stubs' parameter and result types,
    /// whether or not the text carries import lines
    pub imports: Vec<String>,
    /// Number of method stubs
    pub methods: usize,
}

/// Load and check a package.
pub fn load(source: &SourceSpec, config: &LoaderConfig) -> Result<CompilationUnit, ConcreteError> {
    let loader = SourceLoader::new(config.clone());
    let unit = match source {
        SourceSpec::Dir(dir) => loader.load_dir(dir)?,
        SourceSpec::Text { name, text } => loader.load_source(name, text)?,
    };
    Ok(unit)
}

/// Load the request's package and render the implementation.
#[tracing::instrument(skip_all, fields(interface = %request.interface, type_name = %request.type_name))]
pub fn generate(request: &GenerateRequest) -> Result<GenerationResult, ConcreteError> {
    request.validate()?;
    let unit = load(&request.source, &request.loader)?;
    debug!(package = %unit.package().name, files = unit.files().len(), "loaded package");

    let destination = match &request.destination {
        Some(spec) => Some(load(spec, &request.loader)?),
        None => None,
    };
    generate_in(&unit, destination.as_ref(), request)
}

/// Render the implementation for an already loaded package.
/// `destination` is checked for name conflicts instead of `unit` when
/// given.
pub fn generate_in(
    unit: &CompilationUnit,
    destination: Option<&CompilationUnit>,
    request: &GenerateRequest,
) -> Result<GenerationResult, ConcreteError> {
    request.validate()?;

    let iface = resolve(unit, &request.interface)?;
    guard(
        &iface,
        request.package.as_deref(),
        destination.unwrap_or(unit),
        &request.type_name,
    )?;

    let methods = flatten(unit.ctx(), &iface)?;
    debug!(methods = methods.len(), "flattened method set");

    let imports = required_imports(unit, &methods, &iface.package.path);
    let target = StubTarget {
        type_name: request.type_name.clone(),
        package: iface.package.clone(),
        methods,
    };
    let options = RenderOptions {
        mode: request.mode,
        receiver: request.receiver.clone(),
    };
    let text = StubRenderer::new(unit.ctx(), &target.package, &options).render(&target, &imports);
    if request.mode == RenderMode::SameUnit && !imports.is_empty() {
        debug!(imports = ?imports, "imports left to the destination file");
    }

    Ok(GenerationResult {
        type_name: target.type_name,
        package: target.package.name,
        text,
        imports,
        methods: target.methods.len(),
    })
}

/// Generate and hand the text to `sink`. Nothing reaches the sink when any
/// stage fails.
pub fn generate_to(
    request: &GenerateRequest,
    sink: &mut dyn Sink,
) -> Result<GenerationResult, ConcreteError> {
    let result = generate(request)?;
    sink.write_text(&result.text)?;
    debug!(sink = %sink.target(), type_name = %result.type_name, "generated implementation");
    Ok(result)
}

/// Names of the interfaces declared in a package, sorted.
#[tracing::instrument(skip_all)]
pub fn list(source: &SourceSpec, config: &LoaderConfig) -> Result<Vec<String>, ConcreteError> {
    let unit = load(source, config)?;
    Ok(list_interfaces(&unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::StreamSink;

    const RDR: &str = "package temperature\n\nimport \"fmt\"\n\ntype Celsius float64\n\nfunc (c Celsius) String() string { return fmt.Sprintf(\"%g°C\", c) }\n\nfunc (c *Celsius) SetF(f float64) { *c = Celsius(f - 32 / 9 * 5) }\n\ntype Rdr interface {\n\tGet() (string, error)\n\tSet(string) error\n}\n";

    fn request() -> GenerateRequest {
        GenerateRequest::new("Rdr", SourceSpec::text("rdr.go", RDR)).with_type_name("MyRdr")
    }

    #[test]
    fn test_generate() {
        let result = generate(&request().with_package("temperature")).unwrap();
        assert_eq!(result.type_name, "MyRdr");
        assert_eq!(result.package, "temperature");
        assert_eq!(result.methods, 2);
        assert!(result.imports.is_empty());
        assert!(result.text.starts_with("package temperature\n"));
    }

    #[test]
    fn test_failures_never_reach_the_sink() {
        let mut sink = StreamSink::new("buffer", Vec::new());
        let existing = request().with_type_name("Celsius");
        let err = generate_to(&existing, &mut sink).unwrap_err();
        assert!(matches!(err, ConcreteError::AlreadyExists { .. }));

        let missing = GenerateRequest::new("Writer", SourceSpec::text("rdr.go", RDR));
        assert!(matches!(
            generate_to(&missing, &mut sink).unwrap_err(),
            ConcreteError::NotFound { .. }
        ));
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_invalid_names_fail_before_loading() {
        let request = GenerateRequest::new("Rdr", SourceSpec::dir("/definitely/not/here"))
            .with_type_name("my-rdr");
        assert!(matches!(
            generate(&request).unwrap_err(),
            ConcreteError::InvalidTypeName { .. }
        ));
    }

    #[test]
    fn test_list() {
        let names = list(&SourceSpec::text("rdr.go", RDR), &LoaderConfig::default()).unwrap();
        assert_eq!(names, vec!["Rdr"]);
    }
}
