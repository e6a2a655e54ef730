//! Stub rendering
//!
//! Writes the Go text for a new type and one stub method per flattened
//! interface method. Rendering is pure: the same target always produces
//! the same text.

use crate::flatten::{MethodSignature, Typing};
use crate::request::{RenderMode, DEFAULT_RECEIVER};
use concrete_types::{PackageRef, TypeContext, TypeWriter};
use std::fmt::Write;

/// Stand-in parameter list of a method whose signature is unknown.
pub const UNKNOWN_PARAMS: &str = "/* ? */";

/// The type to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubTarget {
    pub type_name: String,
    /// Destination package; type strings are written relative to it
    pub package: PackageRef,
    pub methods: Vec<MethodSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Receiver identifier
    pub receiver: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Standalone,
            receiver: DEFAULT_RECEIVER.to_string(),
        }
    }
}

pub struct StubRenderer<'a> {
    writer: TypeWriter<'a>,
    options: &'a RenderOptions,
}

impl<'a> StubRenderer<'a> {
    pub fn new(ctx: &'a TypeContext, package: &'a PackageRef, options: &'a RenderOptions) -> Self {
        Self {
            writer: TypeWriter::relative_to(ctx, &package.path),
            options,
        }
    }

    /// Render the package clause, the imports (standalone mode only), the
    /// type declaration and every method stub.
    pub fn render(&self, target: &StubTarget, imports: &[String]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "package {}", target.package.name);

        if self.options.mode == RenderMode::Standalone && !imports.is_empty() {
            out.push('\n');
            for path in imports {
                let _ = writeln!(out, "import {:?}", path);
            }
        }

        let _ = write!(out, "\ntype {} struct{{}}\n", target.type_name);

        for method in &target.methods {
            out.push('\n');
            self.write_method(&mut out, &target.type_name, method);
        }
        out
    }

    fn write_method(&self, out: &mut String, type_name: &str, method: &MethodSignature) {
        let Some(typing) = &method.typing else {
            let _ = write!(
                out,
                "func ({} *{}) {}({}) {{\n}}\n",
                self.options.receiver, type_name, method.name, UNKNOWN_PARAMS
            );
            return;
        };

        let shadowed = typing
            .params
            .iter()
            .any(|param| param.name == self.options.receiver);
        let receiver = if shadowed {
            format!("*{}", type_name)
        } else {
            format!("{} *{}", self.options.receiver, type_name)
        };

        let _ = write!(
            out,
            "func ({}) {}({})",
            receiver,
            method.name,
            self.params(typing)
        );
        if !typing.results.is_empty() {
            let results: Vec<String> = typing
                .results
                .iter()
                .map(|&ty| self.writer.type_string(ty))
                .collect();
            let _ = write!(out, " ({})", results.join(", "));
        }
        out.push_str(" {\n");

        // Only a single result gets a return; there is no one obvious
        // combination of zero values for several
        if let [only] = typing.results.as_slice() {
            let _ = writeln!(out, "\treturn {}", self.writer.zero_value(*only));
        }
        out.push_str("}\n");
    }

    fn params(&self, typing: &Typing) -> String {
        let last = typing.params.len().saturating_sub(1);
        typing
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                if typing.variadic && i == last {
                    format!("{} ...{}", param.name, self.writer.variadic_elem_string(param.ty))
                } else {
                    format!("{} {}", param.name, self.writer.type_string(param.ty))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{flatten, Param};
    use crate::imports::required_imports;
    use crate::resolver::resolve;
    use concrete_checker::SourceLoader;
    use concrete_types::BasicKind;

    fn render_source(source: &str, name: &str, options: &RenderOptions) -> String {
        let unit = SourceLoader::default().load_source("p.go", source).unwrap();
        let iface = resolve(&unit, name).unwrap();
        let methods = flatten(unit.ctx(), &iface).unwrap();
        let imports = required_imports(&unit, &methods, &unit.package().path);
        let target = StubTarget {
            type_name: format!("{}Impl", name),
            package: unit.package().clone(),
            methods,
        };
        StubRenderer::new(unit.ctx(), &target.package, options).render(&target, &imports)
    }

    #[test]
    fn test_rdr_round_trip() {
        let unit = SourceLoader::default()
            .load_source(
                "rdr.go",
                "package temperature\n\ntype Rdr interface {\n\tGet() (string, error)\n\tSet(string) error\n}\n",
            )
            .unwrap();
        let iface = resolve(&unit, "Rdr").unwrap();
        let target = StubTarget {
            type_name: "MyRdr".to_string(),
            package: unit.package().clone(),
            methods: flatten(unit.ctx(), &iface).unwrap(),
        };
        let options = RenderOptions::default();
        let text = StubRenderer::new(unit.ctx(), &target.package, &options).render(&target, &[]);
        assert_eq!(
            text,
            "package temperature\n\
             \n\
             type MyRdr struct{}\n\
             \n\
             func (t *MyRdr) Get() (string, error) {\n\
             }\n\
             \n\
             func (t *MyRdr) Set(_ string) (error) {\n\
             \treturn nil\n\
             }\n"
        );
    }

    #[test]
    fn test_standalone_imports_and_foreign_types() {
        let source = r#"package web

import (
	"io"
	"net/http"
)

type Handler interface {
	Serve(w http.ResponseWriter, r *http.Request)
	Body() io.Reader
}
"#;
        let text = render_source(source, "Handler", &RenderOptions::default());
        assert_eq!(
            text,
            "package web\n\
             \n\
             import \"io\"\n\
             import \"net/http\"\n\
             \n\
             type HandlerImpl struct{}\n\
             \n\
             func (t *HandlerImpl) Serve(w http.ResponseWriter, r *http.Request) {\n\
             }\n\
             \n\
             func (t *HandlerImpl) Body() (io.Reader) {\n\
             \treturn nil\n\
             }\n"
        );
    }

    #[test]
    fn test_same_unit_omits_imports() {
        let source = "package p\n\nimport \"io\"\n\ntype R interface {\n\tReader() io.Reader\n}\n";
        let options = RenderOptions {
            mode: RenderMode::SameUnit,
            ..RenderOptions::default()
        };
        let text = render_source(source, "R", &options);
        assert!(!text.contains("import"));
        assert!(text.contains("func (t *RImpl) Reader() (io.Reader) {\n\treturn nil\n}\n"));
    }

    #[test]
    fn test_variadic_and_zero_values() {
        let source = r#"package p

type Point struct {
	X, Y int
}

type Celsius float64

type Calc interface {
	Sum(base int, values ...int) int
	Name() string
	Ok() bool
	Origin() Point
	Temp() Celsius
	Buf() [4]byte
	Fn() func()
}
"#;
        let text = render_source(source, "Calc", &RenderOptions::default());
        assert!(text.contains("func (t *CalcImpl) Sum(base int, values ...int) (int) {\n\treturn 0\n}\n"));
        assert!(text.contains("\treturn \"\"\n"));
        assert!(text.contains("\treturn false\n"));
        assert!(text.contains("func (t *CalcImpl) Origin() (Point) {\n\treturn Point{}\n}\n"));
        assert!(text.contains("func (t *CalcImpl) Temp() (Celsius) {\n\treturn 0\n}\n"));
        assert!(text.contains("\treturn [4]byte{}\n"));
        assert!(text.contains("func (t *CalcImpl) Fn() (func()) {\n\treturn nil\n}\n"));
    }

    #[test]
    fn test_receiver_shadowed_by_parameter() {
        let source = "package p\n\ntype Clock interface {\n\tTick(t int64)\n\tStop(force bool)\n}\n";
        let text = render_source(source, "Clock", &RenderOptions::default());
        assert!(text.contains("func (*ClockImpl) Tick(t int64) {\n}\n"));
        assert!(text.contains("func (t *ClockImpl) Stop(force bool) {\n}\n"));

        let options = RenderOptions {
            receiver: "c".to_string(),
            ..RenderOptions::default()
        };
        let text = render_source(source, "Clock", &options);
        assert!(text.contains("func (c *ClockImpl) Tick(t int64) {\n}\n"));
    }

    #[test]
    fn test_untyped_method_placeholder() {
        let mut ctx = concrete_types::TypeContext::new();
        let int = ctx.basic(BasicKind::Int);
        let package = PackageRef::new("p", "p");
        let target = StubTarget {
            type_name: "X".to_string(),
            package: package.clone(),
            methods: vec![
                MethodSignature {
                    name: "Odd".to_string(),
                    typing: None,
                },
                MethodSignature {
                    name: "Count".to_string(),
                    typing: Some(Typing {
                        params: vec![Param {
                            name: "_".to_string(),
                            ty: int,
                        }],
                        results: vec![int, int],
                        variadic: false,
                    }),
                },
            ],
        };
        let options = RenderOptions::default();
        let text = StubRenderer::new(&ctx, &package, &options).render(&target, &[]);
        assert!(text.contains("func (t *X) Odd(/* ? */) {\n}\n"));
        assert!(text.contains("func (t *X) Count(_ int) (int, int) {\n}\n"));
    }

    #[test]
    fn test_one_stub_per_method() {
        let source = "package p\n\nimport \"io\"\n\ntype RWC interface {\n\tio.ReadWriteCloser\n\tFlush() error\n}\n";
        let text = render_source(source, "RWC", &RenderOptions::default());
        assert_eq!(text.matches("\nfunc (t *RWCImpl) ").count(), 4);
        let read = text.find(") Read(").unwrap();
        let flush = text.find(") Flush(").unwrap();
        assert!(read < flush);
        assert!(text.contains("Read(p []byte) (int, error) {\n}\n"));
    }
}
