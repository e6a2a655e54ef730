//! Interface resolution and stub generation.
//!
//! Given a Go package and the name of one of its interfaces, generates a
//! new type with one stub method per method of the interface's complete
//! method set.
//!
//! # Example
//!
//! ```
//! use concrete_engine::{generate, GenerateRequest, SourceSpec};
//!
//! let source = "package temperature\n\ntype Rdr interface {\n\tGet() (string, error)\n\tSet(string) error\n}\n";
//! let request = GenerateRequest::new("Rdr", SourceSpec::text("rdr.go", source))
//!     .with_type_name("MyRdr");
//! let result = generate(&request).unwrap();
//! assert!(result.text.contains("type MyRdr struct{}"));
//! assert!(result.text.contains("func (t *MyRdr) Set(_ string) (error) {\n\treturn nil\n}"));
//! ```

pub mod error;
pub mod flatten;
pub mod guard;
pub mod imports;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod resolver;
pub mod sink;

pub use error::ConcreteError;
pub use flatten::{flatten, MethodSignature, Param, Typing};
pub use guard::{check_free, guard};
pub use pipeline::{generate, generate_in, generate_to, list, load, GenerationResult};
pub use render::{RenderOptions, StubRenderer, StubTarget};
pub use request::{GenerateRequest, NameTemplate, RenderMode, SourceSpec, DEFAULT_RECEIVER, DEFAULT_TEMPLATE};
pub use resolver::{list_interfaces, resolve, InterfaceDescriptor};
pub use sink::{file_name_for, FileSink, Sink, StreamSink};
